// SPDX-License-Identifier: AGPL-3.0-or-later
//! Format handlers for each supported format

pub mod legacy;
pub mod markdown;
pub mod plaintext;
pub mod tree;

pub use legacy::LegacyHandler;
pub use markdown::MarkdownHandler;
pub use plaintext::PlainTextHandler;
pub use tree::TreeHandler;

use crate::ids::IdGenerator;
use crate::traits::FormatRegistry;
use std::sync::Arc;

/// Registry holding every built-in handler, sharing one id source
pub fn default_registry(ids: Arc<dyn IdGenerator>) -> FormatRegistry {
    let mut registry = FormatRegistry::new();
    registry.register(Box::new(MarkdownHandler::with_ids(Arc::clone(&ids))));
    registry.register(Box::new(PlainTextHandler::new()));
    registry.register(Box::new(LegacyHandler::with_ids(Arc::clone(&ids))));
    registry.register(Box::new(TreeHandler::with_ids(ids)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::traits::{ParseConfig, RenderConfig, SourceFormat};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_registry_has_all_formats() {
        let registry = default_registry(Arc::new(SequentialIds::new()));
        for format in SourceFormat::ALL {
            assert!(registry.get(format).is_some(), "missing {format}");
        }
    }

    #[test]
    fn test_markdown_to_legacy() {
        let registry = default_registry(Arc::new(SequentialIds::new()));
        let output = registry
            .convert(
                "# T\n\n$$\nx\n$$",
                SourceFormat::Markdown,
                SourceFormat::Legacy,
                &ParseConfig::default(),
                &RenderConfig::default(),
            )
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["content"], "# T");
        assert_eq!(value[1]["content"], "$$\nx\n$$");
        // formula blocks keep the id they were built with
        assert_eq!(value[1]["id"], "block-2");
    }
}
