//! 内置校验规则
//!
//! 错误文字由注入的翻译函数根据 `RuleMessage` 生成，
//! 未注入时使用 `Display` 给出的英文默认文字。

use super::{FieldValue, Rule};
use std::fmt;
use std::rc::Rc;

/// 规则失败时的消息键
#[derive(Debug, Clone, PartialEq)]
pub enum RuleMessage {
    Required,
    MinLength(usize),
    MinValue(f64),
    InvalidDate,
}

impl fmt::Display for RuleMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleMessage::Required => write!(f, "This field is required"),
            RuleMessage::MinLength(n) => write!(f, "Must be at least {} characters long", n),
            RuleMessage::MinValue(v) => write!(f, "Must be at least {}", v),
            RuleMessage::InvalidDate => write!(f, "Invalid date"),
        }
    }
}

type Translator = Rc<dyn Fn(&RuleMessage) -> String>;

/// 规则工厂
#[derive(Clone)]
pub struct FormRules {
    translate: Translator,
}

impl FormRules {
    pub fn new(translate: impl Fn(&RuleMessage) -> String + 'static) -> Self {
        Self {
            translate: Rc::new(translate),
        }
    }

    fn fail(&self, message: RuleMessage) -> Result<(), String> {
        Err((self.translate)(&message))
    }

    /// 非空
    pub fn required<V: FieldValue>(&self) -> Rule<V> {
        let rules = self.clone();
        Rule::new(move |value: &V| {
            if value.is_blank() {
                rules.fail(RuleMessage::Required)
            } else {
                Ok(())
            }
        })
    }

    /// 最少字符数
    pub fn min_length(&self, min: usize) -> Rule<String> {
        let rules = self.clone();
        Rule::new(move |value: &String| {
            if value.chars().count() >= min {
                Ok(())
            } else {
                rules.fail(RuleMessage::MinLength(min))
            }
        })
    }

    /// 最小数值，无法取得数值时视为失败
    pub fn min_value<V: FieldValue>(&self, min: f64) -> Rule<V> {
        let rules = self.clone();
        Rule::new(move |value: &V| match value.as_number() {
            Some(n) if n >= min => Ok(()),
            _ => rules.fail(RuleMessage::MinValue(min)),
        })
    }

    /// `dd/mm/yyyy` 格式的出生日期
    pub fn birth_date(&self) -> Rule<String> {
        let rules = self.clone();
        Rule::new(move |value: &String| {
            if is_birth_date(value) {
                Ok(())
            } else {
                rules.fail(RuleMessage::InvalidDate)
            }
        })
    }
}

impl Default for FormRules {
    fn default() -> Self {
        Self::new(|message| message.to_string())
    }
}

fn is_birth_date(value: &str) -> bool {
    let mut parts = value.split('/');
    let (Some(day), Some(month), Some(year)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if day.is_empty() || month.is_empty() || year.is_empty() {
        return false;
    }

    let (Ok(day), Ok(month), Ok(_)) = (day.parse::<u32>(), month.parse::<u32>(), year.parse::<u32>())
    else {
        return false;
    };
    day <= 31 && month <= 12
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        let rule = FormRules::default().required::<String>();
        assert_eq!(rule.check(&String::new()), Err("This field is required".into()));
        assert_eq!(rule.check(&"x".to_string()), Ok(()));
    }

    #[test]
    fn test_min_value_on_numbers_and_text() {
        let rules = FormRules::default();
        let num = rules.min_value::<f64>(1000.0);
        assert!(num.check(&999.5).is_err());
        assert!(num.check(&1000.0).is_ok());

        let text = rules.min_value::<String>(10.0);
        assert!(text.check(&"12".to_string()).is_ok());
        assert!(text.check(&"abc".to_string()).is_err());
    }

    #[test]
    fn test_birth_date() {
        let rule = FormRules::default().birth_date();
        assert!(rule.check(&"15/04/1990".to_string()).is_ok());
        assert!(rule.check(&"32/04/1990".to_string()).is_err());
        assert!(rule.check(&"15/13/1990".to_string()).is_err());
        assert!(rule.check(&"15/04".to_string()).is_err());
        assert!(rule.check(&"15//1990".to_string()).is_err());
    }

    #[test]
    fn test_injected_translator() {
        let rules = FormRules::new(|m| match m {
            RuleMessage::MinLength(n) => format!("Минимум {} символов", n),
            other => other.to_string(),
        });
        assert_eq!(
            rules.min_length(5).check(&"abc".to_string()),
            Err("Минимум 5 символов".into())
        );
    }
}
