/// Convenience result type used across diorama.
pub type DioramaResult<T> = Result<T, DioramaError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum DioramaError {
    /// Invalid or unparseable scene description data.
    #[error("scene error: {0}")]
    Scene(String),

    /// Sprite resolution or decoding failures.
    #[error("asset error: {0}")]
    Asset(String),

    /// Errors while deriving animation state for a frame.
    #[error("animation error: {0}")]
    Animation(String),

    /// Misuse of the compositing surface (buffer shape mismatches).
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DioramaError {
    /// Build a [`DioramaError::Scene`] value.
    pub fn scene(msg: impl Into<String>) -> Self {
        Self::Scene(msg.into())
    }

    /// Build a [`DioramaError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`DioramaError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`DioramaError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_build_matching_variants() {
        assert!(matches!(DioramaError::scene("x"), DioramaError::Scene(_)));
        assert!(matches!(DioramaError::asset("x"), DioramaError::Asset(_)));
        assert!(matches!(
            DioramaError::animation("x"),
            DioramaError::Animation(_)
        ));
        assert!(matches!(DioramaError::render("x"), DioramaError::Render(_)));
    }

    #[test]
    fn display_includes_category_prefix() {
        let e = DioramaError::scene("layer 'boat' names a missing sprite");
        assert_eq!(
            e.to_string(),
            "scene error: layer 'boat' names a missing sprite"
        );
    }

    #[test]
    fn anyhow_errors_pass_through() {
        let inner = anyhow::anyhow!("disk on fire");
        let e = DioramaError::from(inner);
        assert_eq!(e.to_string(), "disk on fire");
    }
}
