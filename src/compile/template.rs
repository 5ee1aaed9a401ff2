// ── Input templates ───────────────────────────────────────────────────────────
//
// How the buffer is turned into the `.tex` file handed to the compiler.

use serde::{Deserialize, Serialize};

/// Wrapping applied to the buffer before compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Template {
    /// `Verbatim` for complete documents, `Math` for fragments.
    #[default]
    Auto,
    /// Display-math fragment inside a minimal `article` with `amsmath`.
    Math,
    /// The buffer is written unchanged.
    Verbatim,
}

const MATH_PREAMBLE: &str = "\\documentclass{article}\n\
                             \\usepackage{amsmath}\n\
                             \\begin{document}\n\
                             \\[\n";

const MATH_POSTAMBLE: &str = "\\]\n\\end{document}\n";

impl Template {
    /// Pick the concrete template for `content`.  Never returns `Auto`.
    pub(crate) fn resolve(self, content: &str) -> Self {
        match self {
            Self::Auto if content.contains("\\documentclass") => Self::Verbatim,
            Self::Auto => Self::Math,
            other => other,
        }
    }

    /// Produce the full compiler input for `content`.
    pub(crate) fn render(self, content: &str) -> String {
        match self.resolve(content) {
            Self::Math => {
                let mut out =
                    String::with_capacity(MATH_PREAMBLE.len() + content.len() + 32);
                out.push_str(MATH_PREAMBLE);
                out.push_str(content);
                out.push('\n');
                out.push_str(MATH_POSTAMBLE);
                out
            }
            _ => content.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn math_wraps_fragment() {
        let out = Template::Math.render("a^2 + b^2 = c^2");
        assert_eq!(
            out,
            "\\documentclass{article}\n\\usepackage{amsmath}\n\\begin{document}\n\
             \\[\na^2 + b^2 = c^2\n\\]\n\\end{document}\n"
        );
    }

    #[test]
    fn verbatim_is_identity() {
        let src = "\\documentclass{book}\n\\begin{document}hi\\end{document}";
        assert_eq!(Template::Verbatim.render(src), src);
    }

    #[test]
    fn auto_detects_full_documents() {
        assert_eq!(Template::Auto.resolve("\\documentclass{article}"), Template::Verbatim);
        assert_eq!(Template::Auto.resolve("\\frac{1}{2}"), Template::Math);
        assert_eq!(Template::Math.resolve("\\documentclass{article}"), Template::Math);
    }
}
