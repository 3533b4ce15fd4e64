//! Best-effort text normalization ahead of tokenization.
//!
//! Word and character counts run over normalized text: lowercased,
//! punctuation stripped, whitespace collapsed. The steps form an explicit
//! ordered list so the policy is visible at a glance, and the pipeline is
//! best-effort: a step that fails is logged at `warn` and the text passes
//! through that step unmodified. Statistics over a personal export should
//! degrade, not abort, on odd input.

use tracing::warn;

/// Error raised by a single transform step.
#[derive(Debug)]
pub struct TransformError {
    /// What the step objected to.
    pub reason: String,
}

type StepFn = fn(&str) -> Result<String, TransformError>;

/// One named step of the pipeline.
#[derive(Clone, Copy)]
pub struct TransformStep {
    /// Step name used in log output.
    pub name: &'static str,
    apply: StepFn,
}

impl TransformStep {
    /// Creates a named step from a transform function.
    pub fn new(name: &'static str, apply: fn(&str) -> Result<String, TransformError>) -> Self {
        Self { name, apply }
    }
}

/// An ordered list of named transform steps.
///
/// # Example
///
/// ```
/// use chatstats::pipeline::TextPipeline;
///
/// let pipeline = TextPipeline::standard();
/// assert_eq!(pipeline.run("Hello,   WORLD!"), "hello world");
/// ```
#[derive(Clone)]
pub struct TextPipeline {
    steps: Vec<TransformStep>,
}

impl TextPipeline {
    /// The standard normalization used for word/character statistics:
    /// lowercase → strip punctuation → collapse whitespace.
    pub fn standard() -> Self {
        Self {
            steps: vec![
                TransformStep {
                    name: "lowercase",
                    apply: lowercase,
                },
                TransformStep {
                    name: "strip_punctuation",
                    apply: strip_punctuation,
                },
                TransformStep {
                    name: "collapse_whitespace",
                    apply: collapse_whitespace,
                },
            ],
        }
    }

    /// Builds a pipeline from an explicit step list.
    pub fn with_steps(steps: Vec<TransformStep>) -> Self {
        Self { steps }
    }

    /// Runs every step in order.
    ///
    /// A failing step leaves the text as it was before that step; the
    /// remaining steps still run. Failures are logged, never surfaced.
    pub fn run(&self, input: &str) -> String {
        let mut text = input.to_string();
        for step in &self.steps {
            match (step.apply)(&text) {
                Ok(out) => text = out,
                Err(err) => {
                    warn!(
                        step = step.name,
                        reason = %err.reason,
                        "text transform failed; continuing with unmodified text"
                    );
                }
            }
        }
        text
    }

    /// Normalizes and splits into whitespace tokens.
    pub fn tokenize(&self, input: &str) -> Vec<String> {
        self.run(input)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

impl Default for TextPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for TextPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.steps.iter().map(|s| s.name).collect();
        f.debug_struct("TextPipeline").field("steps", &names).finish()
    }
}

fn lowercase(text: &str) -> Result<String, TransformError> {
    Ok(text.to_lowercase())
}

fn strip_punctuation(text: &str) -> Result<String, TransformError> {
    // Keep alphanumerics and whitespace; punctuation becomes a space so
    // "one,two" tokenizes as two words rather than fusing.
    Ok(text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect())
}

fn collapse_whitespace(text: &str) -> Result<String, TransformError> {
    Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_pipeline() {
        let p = TextPipeline::standard();
        assert_eq!(p.run("Hello, World!"), "hello world");
        assert_eq!(p.run("  a   b  "), "a b");
        assert_eq!(p.run(""), "");
    }

    #[test]
    fn test_punctuation_splits_tokens() {
        let p = TextPipeline::standard();
        assert_eq!(p.tokenize("one,two...three"), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_unicode_preserved() {
        let p = TextPipeline::standard();
        assert_eq!(p.tokenize("Tőke Hal!"), vec!["tőke", "hal"]);
    }

    #[test]
    fn test_failing_step_is_skipped() {
        fn always_fails(_: &str) -> Result<String, TransformError> {
            Err(TransformError {
                reason: "nope".to_string(),
            })
        }

        let p = TextPipeline::with_steps(vec![
            TransformStep {
                name: "broken",
                apply: always_fails,
            },
            TransformStep {
                name: "lowercase",
                apply: lowercase,
            },
        ]);
        // The broken step contributes nothing; lowercase still runs.
        assert_eq!(p.run("ABC"), "abc");
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let p = TextPipeline::with_steps(vec![]);
        assert_eq!(p.run("As-Is"), "As-Is");
    }
}
