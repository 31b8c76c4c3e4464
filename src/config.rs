//! Loading trainer configuration (prompt overrides) from TOML.
//!
//! See `TrainerConfig` and `Prompts` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TrainerConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Prompt used when asking the model to write questions. The default targets
/// the Intermediate Accounting certification; override it in TOML to retune
/// tone or retarget the exam.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  /// Generation template with `{count}` and `{material}` placeholders.
  /// It must keep demanding a bare JSON array with the five item keys;
  /// the parser depends on that contract.
  pub generation_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      generation_template: r#"你是一名中级会计职称考试的资深命题专家。请根据下面的学习材料，命制{count}道单项选择题。

学习材料：
{material}

命题要求：
1. 每道题只有一个正确答案，四个选项依次以“A. ”“B. ”“C. ”“D. ”开头。
2. 直接返回一个JSON数组，不要输出任何说明文字，不要使用markdown代码块。
3. 数组元素的字段为：question（题干）、options（四个选项的数组）、answer（正确选项的字母）、explanation（答案解析）、suggestion（学习建议）。
4. 格式示例：[{"question": "……", "options": ["A. ……", "B. ……", "C. ……", "D. ……"], "answer": "A", "explanation": "……", "suggestion": "……"}]"#
        .into(),
    }
  }
}

/// Attempt to load `TrainerConfig` from TRAINER_CONFIG_PATH. On any
/// parsing/IO error, returns None and the defaults apply.
pub fn load_trainer_config_from_env() -> Option<TrainerConfig> {
  let path = std::env::var("TRAINER_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<TrainerConfig>(&s) {
      Ok(cfg) => {
        info!(target: "zhongkuai_backend", %path, "Loaded trainer config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "zhongkuai_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "zhongkuai_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_template_names_every_item_key_and_placeholder() {
    let p = Prompts::default();
    for key in ["question", "options", "answer", "explanation", "suggestion"] {
      assert!(p.generation_template.contains(key), "missing key {key}");
    }
    assert!(p.generation_template.contains("{count}"));
    assert!(p.generation_template.contains("{material}"));
  }

  #[test]
  fn toml_override_replaces_the_template() {
    let cfg: TrainerConfig =
      toml::from_str("[prompts]\ngeneration_template = \"出{count}道题：{material}\"").unwrap();
    assert_eq!(cfg.prompts.generation_template, "出{count}道题：{material}");
  }
}
