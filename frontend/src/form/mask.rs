//! 输入掩码
//!
//! 语法：`9` 数字，`a` 字母，`*` 字母或数字，其他字符原样保留。

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Digit,
    Letter,
    Alphanumeric,
    Literal(char),
}

impl Slot {
    fn accepts(&self, c: char) -> bool {
        match self {
            Slot::Digit => c.is_ascii_digit(),
            Slot::Letter => c.is_alphabetic(),
            Slot::Alphanumeric => c.is_alphanumeric(),
            Slot::Literal(l) => *l == c,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMask {
    pattern: String,
    slots: Vec<Slot>,
}

impl InputMask {
    pub fn new(pattern: &str) -> Self {
        let slots = pattern
            .chars()
            .map(|c| match c {
                '9' => Slot::Digit,
                'a' => Slot::Letter,
                '*' => Slot::Alphanumeric,
                other => Slot::Literal(other),
            })
            .collect();
        Self {
            pattern: pattern.to_string(),
            slots,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// 按掩码格式化原始输入
    ///
    /// 不符合占位符的字符被跳过；结果不以多余的字面量结尾。
    pub fn apply(&self, raw: &str) -> String {
        let mut out = String::new();
        let mut filled_len = 0;
        let mut input = raw.chars().peekable();

        for slot in &self.slots {
            if input.peek().is_none() {
                break;
            }
            match slot {
                Slot::Literal(l) => {
                    out.push(*l);
                    if input.peek() == Some(l) {
                        input.next();
                    }
                }
                placeholder => {
                    let Some(c) = input.by_ref().find(|c| placeholder.accepts(*c)) else {
                        break;
                    };
                    out.push(c);
                    filled_len = out.len();
                }
            }
        }

        out.truncate(filled_len);
        out
    }

    /// 值是否完整填满掩码
    pub fn is_complete(&self, value: &str) -> bool {
        value.chars().count() == self.slots.len()
            && value
                .chars()
                .zip(&self.slots)
                .all(|(c, slot)| slot.accepts(c))
    }

    /// 去除字面量，只保留填入的字符
    pub fn unmask(&self, value: &str) -> String {
        value
            .chars()
            .zip(&self.slots)
            .filter(|(_, slot)| !matches!(slot, Slot::Literal(_)))
            .map(|(c, _)| c)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_formats_digits() {
        let mask = InputMask::new("99/99/9999");
        assert_eq!(mask.apply("01021990"), "01/02/1990");
        assert_eq!(mask.apply("01/02"), "01/02");
        assert_eq!(mask.apply("0102"), "01/02");
        assert_eq!(mask.apply("ab"), "");
    }

    #[test]
    fn test_complete_and_unmask() {
        let mask = InputMask::new("+999 (99) 999-99-99");
        let full = mask.apply("+998 90 123 45 67");
        assert_eq!(full, "+998 (90) 123-45-67");
        assert!(mask.is_complete(&full));
        assert!(!mask.is_complete("+998 (90"));
        assert_eq!(mask.unmask(&full), "998901234567");
    }

    #[test]
    fn test_letter_and_alnum_slots() {
        let mask = InputMask::new("aa-**");
        assert_eq!(mask.apply("AB1c"), "AB-1c");
        assert!(mask.is_complete("AB-1c"));
        assert!(!mask.is_complete("A1-1c"));
    }
}
