use crate::config::Config;
use crate::error::Result;
use crate::git::LogSource;
use crate::report::classifier::Classifier;
use crate::report::template::{Renderer, TemplateParams};
use crate::report::{Aggregation, ProjectInfo, WeeklyReport};
use chrono::Utc;
use tracing::info;

/// Orchestrator for coordinating the report workflow
pub struct Orchestrator {
    config: Config,
    classifier: Classifier,
    renderer: Renderer,
}

impl Orchestrator {
    /// Create a new orchestrator. Fails on invalid categories or delimiter
    /// before anything is read or rendered.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let classifier = Classifier::new(config.category_set()?, config.delimiter)?
            .with_delimiter_variants(config.delimiter_variants.clone())
            .with_quote_chars(config.quote_char_list());
        let renderer = Renderer::new()?;

        Ok(Self {
            config,
            classifier,
            renderer,
        })
    }

    /// Fetch the raw log text
    pub fn fetch_log(&self, source: &LogSource) -> Result<String> {
        let text = source.read()?;
        info!(source = %source.describe(), bytes = text.len(), "fetched log text");
        Ok(text)
    }

    /// Classify log text
    pub fn classify(&self, log_text: &str) -> Aggregation {
        self.classifier.classify(log_text)
    }

    /// Build the parameter store for one run.
    ///
    /// Write order: config `[params]`, `extra`, project fields, derived
    /// totals/lists, `totalMsg`.
    pub fn build_params(
        &self,
        aggregation: &Aggregation,
        project: &ProjectInfo,
        extra: &[(String, String)],
    ) -> TemplateParams {
        let mut params: TemplateParams = self
            .config
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        params.extend(extra.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        params.insert("projectName", project.name.as_str());
        params.insert("projectProcess", project.progress.as_str());

        let mut derived = aggregation.to_params(&self.config.list_separator);

        // Totals the sentence names but no configured category provides count as 0
        for key in self
            .renderer
            .missing_keys(&self.config.summary_sentence, &derived)
        {
            if key.ends_with("Total") {
                derived.insert(key, "0");
            }
        }

        let total_msg = self.renderer.render(&self.config.summary_sentence, &derived);
        params.extend(derived.iter());
        params.insert("totalMsg", total_msg);

        params
    }

    /// Render one template against the store
    pub fn render(&self, template: &str, params: &TemplateParams) -> String {
        self.renderer.render(template, params)
    }

    /// Classify the log and render both report templates
    pub fn generate(
        &self,
        log_text: &str,
        project: &ProjectInfo,
        extra: &[(String, String)],
    ) -> WeeklyReport {
        let aggregation = self.classify(log_text);
        for tally in aggregation.tallies() {
            info!(category = %tally.category, count = tally.count(), "category total");
        }

        let params = self.build_params(&aggregation, project, extra);

        let summary = self.render(&self.config.templates.summary, &params);
        let detail = self.render(&self.config.templates.detail, &params);

        WeeklyReport {
            project: project.clone(),
            aggregation,
            params,
            summary,
            detail,
            generated_at: Utc::now(),
        }
    }

    /// Get a reference to the config
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecapError;

    const SCENARIO_LOG: &str =
        "add:Implement login\nfix:Null pointer on save\ntodo:Write integration tests\n";

    fn demo() -> ProjectInfo {
        ProjectInfo::new("Demo", "80")
    }

    #[test]
    fn test_orchestrator_rejects_bad_categories() {
        let mut config = Config::default();
        config.categories = vec!["has space".to_string()];
        assert!(matches!(
            Orchestrator::new(config),
            Err(RecapError::InvalidCategory { .. })
        ));
    }

    #[test]
    fn test_end_to_end_scenario() {
        let orchestrator = Orchestrator::new(Config::default()).unwrap();
        let report = orchestrator.generate(SCENARIO_LOG, &demo(), &[]);

        assert_eq!(report.params.get("addTotal"), Some("1"));
        assert_eq!(report.params.get("fixTotal"), Some("1"));
        assert_eq!(report.params.get("todoTotal"), Some("1"));

        assert!(report.summary.contains("【Demo】"));
        assert!(report.summary.contains("Demo进度80%"));
        assert!(report.summary.contains("本周共完成1个功能开发，修复了1个bug"));

        assert!(report.detail.contains("【完成功能清单】\nImplement login\n"));
        assert!(report.detail.contains("【修复bug清单】\nNull pointer on save\n"));
        assert!(report.detail.contains("【计划工作清单】\nWrite integration tests\n"));
    }

    #[test]
    fn test_empty_log_renders_zero_counts() {
        let orchestrator = Orchestrator::new(Config::default()).unwrap();
        let report = orchestrator.generate("", &demo(), &[]);

        assert_eq!(report.aggregation.total(), 0);
        assert_eq!(report.params.get("totalMsg"), Some("本周共完成0个功能开发，修复了0个bug"));
        assert!(report.summary.contains("本周共完成0个功能开发，修复了0个bug"));
        // Unset placeholders render empty
        assert!(report.summary.contains("二、下周计划开展内容：\n\n"));
    }

    #[test]
    fn test_extra_and_config_params() {
        let mut config = Config::default();
        config.params.insert("needHelp".to_string(), "none".to_string());
        let orchestrator = Orchestrator::new(config).unwrap();

        let extra = vec![("nextPlain".to_string(), "ship v2".to_string())];
        let report = orchestrator.generate(SCENARIO_LOG, &demo(), &extra);

        assert!(report.summary.contains("二、下周计划开展内容：\nship v2"));
        assert!(report.summary.contains("三、需要协调处理的问题：\nnone"));
    }

    #[test]
    fn test_derived_fields_win_over_extra() {
        let orchestrator = Orchestrator::new(Config::default()).unwrap();
        let extra = vec![("addTotal".to_string(), "99".to_string())];
        let report = orchestrator.generate(SCENARIO_LOG, &demo(), &extra);
        assert_eq!(report.params.get("addTotal"), Some("1"));
    }

    #[test]
    fn test_custom_list_separator_and_sentence() {
        let mut config = Config::default();
        config.list_separator = "; ".to_string();
        config.summary_sentence = "${addTotal} added, ${fixTotal} fixed".to_string();
        let orchestrator = Orchestrator::new(config).unwrap();

        let report = orchestrator.generate("add:a\nadd:b\nfix:c", &demo(), &[]);
        assert_eq!(report.params.get("addList"), Some("a; b"));
        assert_eq!(report.params.get("totalMsg"), Some("2 added, 1 fixed"));
    }

    #[test]
    fn test_sentence_counts_unconfigured_categories_as_zero() {
        let mut config = Config::default();
        config.categories = vec!["feat".to_string(), "fix".to_string()];
        let orchestrator = Orchestrator::new(config).unwrap();

        let report = orchestrator.generate("", &demo(), &[]);
        assert_eq!(
            report.params.get("totalMsg"),
            Some("本周共完成0个功能开发，修复了0个bug")
        );

        let report = orchestrator.generate("fix:crash\nfeat:search", &demo(), &[]);
        assert_eq!(
            report.params.get("totalMsg"),
            Some("本周共完成0个功能开发，修复了1个bug")
        );
        assert_eq!(report.params.get("featTotal"), Some("1"));
    }

    #[test]
    fn test_renders_are_independent() {
        let orchestrator = Orchestrator::new(Config::default()).unwrap();
        let report = orchestrator.generate(SCENARIO_LOG, &demo(), &[]);

        let again = orchestrator.render(&orchestrator.config().templates.summary, &report.params);
        assert_eq!(again, report.summary);
    }

    #[test]
    fn test_to_text_contains_both_reports() {
        let orchestrator = Orchestrator::new(Config::default()).unwrap();
        let report = orchestrator.generate(SCENARIO_LOG, &demo(), &[]);
        let text = report.to_text();
        assert!(text.starts_with(&report.summary));
        assert!(text.contains(&report.detail));
    }
}
