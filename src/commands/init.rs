//! Initialize a new portfolio site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::content::loader::PROJECTS_DIR;
use crate::generator::STATIC_DIR;
use crate::CONFIG_FILE;

const CONFIG_TEMPLATE: &str = r#"# Site
title: My Portfolio
description: Data science and machine learning projects
author: Jane Doe
language: en

# URL
url: http://example.com
root: /

# Directory
source_dir: source
public_dir: public

highlight:
  theme: base16-ocean.dark

reading:
  words_per_minute: 200
  excerpt_length: 150

# The access key can also be supplied via WEB3FORMS_ACCESS_KEY
contact:
  endpoint: https://api.web3forms.com/submit
  access_key:
  from_name: Portfolio Contact Form
  timeout_secs: 10

profile:
  name: Jane Doe
  headline: Data Scientist
  bio: I turn messy data into decisions.
  email: jane@example.com
  resumeUrl: /resume.pdf
  links:
    - label: GitHub
      url: https://github.com/janedoe

experience:
  - role: Data Scientist
    company: Example Corp
    location: Remote
    startDate: 2022-01
    achievements:
      - Shipped a churn model used by the retention team
    order: 1
"#;

const SAMPLE_PROJECT: &str = r#"---
title: Hello Portfolio
slug: hello-portfolio
overview: A first project write-up to start from.
techStack:
  - Python
  - Pandas
featured: true
order: 1
date: 2024-01
---

Welcome! Each markdown file under `source/_projects` becomes a project page.

## Getting started

```python
import pandas as pd

df = pd.read_csv("data.csv")
print(df.describe())
```

Run `folio new "My Project"` to create another one.
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("A site already exists in {:?}", target_dir);
    }

    let source_dir = target_dir.join("source");
    fs::create_dir_all(source_dir.join(PROJECTS_DIR))?;
    fs::create_dir_all(source_dir.join(STATIC_DIR).join("images"))?;

    fs::write(&config_path, CONFIG_TEMPLATE)?;
    fs::write(
        source_dir.join(PROJECTS_DIR).join("hello-portfolio.md"),
        SAMPLE_PROJECT,
    )?;

    tracing::debug!("Scaffolded site in {:?}", target_dir);
    Ok(())
}
