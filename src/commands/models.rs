//! `dockerize models` command.

use crate::model::ProviderKind;

/// Execute the `models` command.
pub fn run(provider: Option<ProviderKind>) {
    print!("{}", render(provider));
}

fn render(provider: Option<ProviderKind>) -> String {
    let kinds = match provider {
        Some(kind) => vec![kind],
        None => vec![ProviderKind::Gemini, ProviderKind::Openai, ProviderKind::Custom],
    };

    let mut out = String::new();
    for kind in kinds {
        out.push_str(&format!("{} ({kind}):\n", kind.label()));
        let models = kind.suggested_models();
        if models.is_empty() {
            out.push_str("  any model served by your endpoint (set with --model)\n");
        }
        for (id, label) in models {
            out.push_str(&format!("  {id:<24} {label}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_provider_by_default() {
        let out = render(None);
        assert!(out.contains("gemini-3-pro-preview"));
        assert!(out.contains("gpt-3.5-turbo"));
        assert!(out.contains("Custom (OpenAI Compatible) (custom)"));
    }

    #[test]
    fn filters_to_one_provider() {
        let out = render(Some(ProviderKind::Openai));
        assert!(out.contains("gpt-4o"));
        assert!(!out.contains("gemini"));
    }
}
