//! YAML frontmatter assembly.
//!
//! Hand-assembled rather than serialized through a YAML crate: the target
//! site's content pipeline is picky about field order and quoting, so the
//! output format is fixed here, field by field.

use chrono::NaiveDate;

/// The fields that go into a post's frontmatter block.
#[derive(Debug, Clone)]
pub struct Frontmatter {
    pub title: String,
    pub description: Option<String>,
    pub published: NaiveDate,
    pub redirect_from: Vec<String>,
    pub categories: Vec<String>,
    pub hero: String,
}

impl Frontmatter {
    /// Renders the delimited frontmatter block, trailing newline included.
    pub fn render(&self) -> String {
        let mut out = String::from("---\n");

        out.push_str(&format!("title: '{}'\n", escape_single_quoted(&self.title)));
        if let Some(description) = &self.description {
            out.push_str(&format!(
                "description: '{}'\n",
                escape_single_quoted(description)
            ));
        }
        out.push_str(&format!("published: {}\n", self.published.format("%Y-%m-%d")));
        if !self.redirect_from.is_empty() {
            out.push_str("redirectFrom:\n");
            for path in &self.redirect_from {
                out.push_str(&format!("  - {path}\n"));
            }
        }
        if !self.categories.is_empty() {
            out.push_str(&format!(
                "categories: '{}'\n",
                escape_single_quoted(&self.categories.join(", "))
            ));
        }
        out.push_str(&format!("hero: {}\n", self.hero));
        out.push_str("---\n");
        out
    }
}

/// YAML single-quoted escaping: double every quote.
fn escape_single_quoted(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Frontmatter {
        Frontmatter {
            title: "Rust's Ownership".into(),
            description: Some("What ownership means.".into()),
            published: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            redirect_from: vec!["/2020/01/rusts-ownership/".into()],
            categories: vec!["Rust".into(), "Basics".into()],
            hero: "./img/hero.png".into(),
        }
    }

    #[test]
    fn test_render_full_block() {
        let out = sample().render();
        assert_eq!(
            out,
            "---\n\
             title: 'Rust''s Ownership'\n\
             description: 'What ownership means.'\n\
             published: 2020-01-01\n\
             redirectFrom:\n\
             \x20 - /2020/01/rusts-ownership/\n\
             categories: 'Rust, Basics'\n\
             hero: ./img/hero.png\n\
             ---\n"
        );
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let mut fm = sample();
        fm.description = None;
        fm.redirect_from.clear();
        fm.categories.clear();
        let out = fm.render();
        assert!(!out.contains("description:"));
        assert!(!out.contains("redirectFrom:"));
        assert!(!out.contains("categories:"));
        assert!(out.contains("title:"));
        assert!(out.contains("hero:"));
    }
}
