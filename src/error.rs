use petgraph::stable_graph::NodeIndex;

/// Errors raised while building, simulating or rendering an outbreak.
#[derive(Debug, thiserror::Error)]
pub enum SpreadError {
    /// A numeric parameter is outside its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A rule name that none of the color changing rules answer to.
    #[error("unknown rule `{0}` (expected target_set_selection, stochastic or deterministic)")]
    UnknownRule(String),

    /// The graph shape makes a computation undefined for a node.
    #[error("degenerate topology at node {node:?}: {reason}")]
    Topology {
        /// Node where the computation broke down.
        node: NodeIndex,
        /// What made it degenerate.
        reason: &'static str,
    },

    /// Reading or writing frames and directories failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Drawing a frame or encoding the animation failed.
    #[error("render error: {reason}")]
    Render {
        /// Message from the drawing backend or encoder.
        reason: String,
    },

    /// A configuration file could not be parsed.
    #[error("failed to parse config: {0}")]
    Config(#[from] serde_json::Error),
}

impl SpreadError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn render(reason: impl ToString) -> Self {
        Self::Render {
            reason: reason.to_string(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SpreadError>;

/// Checks that `p` is a probability.
pub(crate) fn check_probability(name: &'static str, p: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(SpreadError::invalid(
            name,
            format!("{p} is not a probability in [0, 1]"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probability_bounds() {
        assert!(check_probability("p", 0.0).is_ok());
        assert!(check_probability("p", 1.0).is_ok());
        assert!(check_probability("p", -0.1).is_err());
        assert!(check_probability("p", 1.5).is_err());
        assert!(check_probability("p", f64::NAN).is_err());
    }

    #[test]
    fn unknown_rule_message_names_the_rule() {
        let err = SpreadError::UnknownRule("majority".to_owned());
        assert!(err.to_string().contains("majority"));
    }
}
