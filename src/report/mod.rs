pub mod category;
pub mod classifier;
pub mod template;

use crate::report::category::CategorySet;
use crate::report::template::TemplateParams;
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Summary report template: overall progress and next steps
pub const DEFAULT_SUMMARY_TEMPLATE: &str = "
【${projectName}】
一、本周项目实施情况汇总：
${projectName}进度${projectProcess}%。${totalMsg}。

二、下周计划开展内容：
${nextPlain}

三、需要协调处理的问题：
${needHelp}";

/// Detail report template: one list per category
pub const DEFAULT_DETAIL_TEMPLATE: &str = "
【${projectName}】
【完成功能清单】
${addList}

【修复bug清单】
${fixList}

【计划工作清单】
${todoList}
";

/// Sentence stored as `totalMsg`, rendered from the per-category totals
pub const DEFAULT_SUMMARY_SENTENCE: &str = "本周共完成${addTotal}个功能开发，修复了${fixTotal}个bug";

/// Caller-supplied project fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectInfo {
    /// Project name, `projectName` in templates
    pub name: String,
    /// Progress percentage, `projectProcess` in templates
    pub progress: String,
}

impl ProjectInfo {
    pub fn new<N: Into<String>, P: Into<String>>(name: N, progress: P) -> Self {
        Self {
            name: name.into(),
            progress: progress.into(),
        }
    }
}

/// Messages collected for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTally {
    pub category: String,
    pub messages: Vec<String>,
}

impl CategoryTally {
    pub fn count(&self) -> usize {
        self.messages.len()
    }
}

impl Serialize for CategoryTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CategoryTally", 3)?;
        state.serialize_field("category", &self.category)?;
        state.serialize_field("count", &self.count())?;
        state.serialize_field("messages", &self.messages)?;
        state.end()
    }
}

/// Per-category results of one classification pass, in configured order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Aggregation {
    tallies: Vec<CategoryTally>,
}

impl Aggregation {
    /// Zero counts and empty lists for every category
    pub fn empty(categories: &CategorySet) -> Self {
        Self {
            tallies: categories
                .keywords()
                .iter()
                .map(|category| CategoryTally {
                    category: category.clone(),
                    messages: Vec::new(),
                })
                .collect(),
        }
    }

    /// Append a message to its category; returns false for unknown categories
    pub fn record(&mut self, category: &str, message: &str) -> bool {
        match self.tallies.iter_mut().find(|t| t.category == category) {
            Some(tally) => {
                tally.messages.push(message.to_string());
                true
            }
            None => false,
        }
    }

    pub fn get(&self, category: &str) -> Option<&CategoryTally> {
        self.tallies.iter().find(|t| t.category == category)
    }

    /// Count for a category, 0 when it is not configured
    #[allow(dead_code)]
    pub fn count(&self, category: &str) -> usize {
        self.get(category).map_or(0, CategoryTally::count)
    }

    /// Messages for a category, empty when it is not configured
    #[allow(dead_code)]
    pub fn messages(&self, category: &str) -> &[String] {
        self.get(category)
            .map(|t| t.messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn tallies(&self) -> &[CategoryTally] {
        &self.tallies
    }

    /// Total number of fragments across categories
    pub fn total(&self) -> usize {
        self.tallies.iter().map(CategoryTally::count).sum()
    }

    /// `<category>Total` and `<category>List` entries for every category
    pub fn to_params(&self, list_separator: &str) -> TemplateParams {
        let mut params = TemplateParams::new();

        for tally in &self.tallies {
            params.insert(format!("{}Total", tally.category), tally.count().to_string());
            params.insert(format!("{}List", tally.category), tally.messages.join(list_separator));
        }

        params
    }
}

/// Both rendered reports plus the data they were built from
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyReport {
    pub project: ProjectInfo,
    pub aggregation: Aggregation,
    pub params: TemplateParams,
    pub summary: String,
    pub detail: String,
    pub generated_at: DateTime<Utc>,
}

impl WeeklyReport {
    /// Summary followed by detail, each on its own block
    pub fn to_text(&self) -> String {
        format!("{}\n{}\n", self.summary, self.detail)
    }
}
