use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Privacy,
    Finance,
    Consumer,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Privacy => "Privacy",
            Category::Finance => "Finance",
            Category::Consumer => "Consumer",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaseTypeRule {
    pub keyword: String,
    pub label: String,
}

/// Keyword tables for tagging a settlement by its name. Rules are checked in
/// order and the first hit wins; anything unmatched is `Consumer`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierRules {
    pub categories: Vec<CategoryRule>,
    pub case_types: Vec<CaseTypeRule>,
    pub brands: Vec<String>,
}

const PRIVACY_KEYWORDS: &[&str] = &["data breach", "data privacy", "privacy"];

const FINANCE_KEYWORDS: &[&str] = &[
    "mortgage", "credit", "bank", "insurance", "401(k)", "retirement", "investment",
    "wells fargo", "capital one", "robinhood", "chase", "citibank", "equifax", "navient",
];

const CASE_TYPES: &[(&str, &str)] = &[
    ("data breach", "Data Breach"),
    ("ftc", "FTC Case"),
    ("antitrust", "Antitrust"),
    ("privacy", "Data Privacy"),
];

const MAJOR_BRANDS: &[&str] = &[
    "23andme", "amazon", "google", "facebook", "meta", "apple", "microsoft",
    "capital one", "wells fargo", "robinhood", "doordash", "uber", "lyft",
    "target", "walmart", "nissan", "toyota", "ford", "hyundai", "kia",
    "kaiser", "theranos", "peloton",
];

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            categories: vec![
                CategoryRule {
                    category: Category::Privacy,
                    keywords: owned(PRIVACY_KEYWORDS),
                },
                CategoryRule {
                    category: Category::Finance,
                    keywords: owned(FINANCE_KEYWORDS),
                },
            ],
            case_types: CASE_TYPES
                .iter()
                .map(|(keyword, label)| CaseTypeRule {
                    keyword: keyword.to_string(),
                    label: label.to_string(),
                })
                .collect(),
            brands: owned(MAJOR_BRANDS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: Category,
    pub case_type: Option<String>,
    pub is_major_brand: bool,
}

impl ClassifierRules {
    pub fn classify(&self, name: &str, company: &str) -> Classification {
        let name = name.to_lowercase();
        let company = company.to_lowercase();

        let category = self
            .categories
            .iter()
            .find(|rule| contains_any(&name, &rule.keywords))
            .map(|rule| rule.category)
            .unwrap_or(Category::Consumer);

        let case_type = self
            .case_types
            .iter()
            .find(|rule| name.contains(&rule.keyword.to_lowercase()))
            .map(|rule| rule.label.clone());

        let is_major_brand =
            contains_any(&company, &self.brands) || contains_any(&name, &self.brands);

        Classification {
            category,
            case_type,
            is_major_brand,
        }
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|n| !n.is_empty() && haystack.contains(&n.to_lowercase()))
}
