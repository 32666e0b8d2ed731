//! Locale descriptors parsed from platform identifiers such as `en_US.UTF-8`.

use std::fmt;

/// A parsed locale: language plus optional script, region and variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    script: Option<String>,
    region: Option<String>,
    variant: Option<String>,
}

impl Locale {
    /// Identifier of the neutral locale used when none is available.
    pub const POSIX_IDENTIFIER: &'static str = "en_US_POSIX";

    pub fn posix() -> Self {
        Self {
            language: "en".into(),
            script: None,
            region: Some("US".into()),
            variant: Some("POSIX".into()),
        }
    }

    /// Parses POSIX (`de_DE.UTF-8@euro`), ICU (`zh_Hant_TW`) and BCP 47
    /// (`pt-BR`) style identifiers. `C` and `POSIX` map to [`Locale::posix`].
    ///
    /// ```
    /// use telemetry_util::Locale;
    ///
    /// let locale = Locale::parse("pt-br.UTF-8").unwrap();
    /// assert_eq!(locale.identifier(), "pt_BR");
    /// assert_eq!(locale.language_tag(), "pt-BR");
    /// ```
    pub fn parse(identifier: &str) -> Option<Self> {
        let base = identifier.split(['.', '@']).next().unwrap_or_default().trim();
        if base.is_empty() {
            return None;
        }
        if base == "C" || base == "POSIX" {
            return Some(Self::posix());
        }

        let mut parts = base.split(['_', '-']);
        let language = parts.next()?;
        if !(2..=3).contains(&language.len()) || !is_alpha(language) {
            return None;
        }
        let mut locale = Self {
            language: language.to_ascii_lowercase(),
            script: None,
            region: None,
            variant: None,
        };

        for part in parts {
            if locale.variant.is_some() {
                return None;
            }
            let empty_tail = locale.script.is_none() && locale.region.is_none();
            if empty_tail && part.len() == 4 && is_alpha(part) {
                locale.script = Some(title_case(part));
            } else if locale.region.is_none() && is_region(part) {
                locale.region = Some(part.to_ascii_uppercase());
            } else if !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()) {
                locale.variant = Some(part.to_ascii_uppercase());
            } else {
                return None;
            }
        }
        Some(locale)
    }

    pub fn language_code(&self) -> &str {
        &self.language
    }

    pub fn script_code(&self) -> Option<&str> {
        self.script.as_deref()
    }

    pub fn region_code(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Underscore-joined identifier, e.g. `zh_Hant_TW`.
    pub fn identifier(&self) -> String {
        self.join('_')
    }

    /// BCP 47 language tag, e.g. `zh-Hant-TW`. The variant is left out.
    pub fn language_tag(&self) -> String {
        let mut tag = self.language.clone();
        for part in [&self.script, &self.region].into_iter().flatten() {
            tag.push('-');
            tag.push_str(part);
        }
        tag
    }

    fn join(&self, sep: char) -> String {
        let mut out = self.language.clone();
        for part in [&self.script, &self.region, &self.variant]
            .into_iter()
            .flatten()
        {
            out.push(sep);
            out.push_str(part);
        }
        out
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::posix()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}

fn is_alpha(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_region(s: &str) -> bool {
    (s.len() == 2 && is_alpha(s)) || (s.len() == 3 && s.chars().all(|c| c.is_ascii_digit()))
}

fn title_case(s: &str) -> String {
    let lower = s.to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
