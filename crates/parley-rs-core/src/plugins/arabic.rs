use super::{Plugin, PluginContext};
use async_trait::async_trait;

const ARABIC_LETTERS: &str = "ءآأؤإئابةتثجحخدذرزسشصضطظعغفقكلمنهوي";
const LANGUAGE_KEY: &str = "language";
const LANGUAGE_ARABIC: &str = "arabic";
/// Right-to-left mark.
const RLM: char = '\u{200F}';

/// Tags messages containing Arabic letters and, for those, inserts a
/// right-to-left mark after word-final `ه` and `ة` in the response so mixed
/// text renders in the right direction.
#[derive(Debug, Default)]
pub struct ArabicScriptPlugin;

#[async_trait]
impl Plugin for ArabicScriptPlugin {
    fn name(&self) -> &str {
        "arabic_script"
    }

    async fn on_message(
        &self,
        _user_id: &str,
        message: &str,
        mut context: PluginContext,
    ) -> PluginContext {
        if message.chars().any(|ch| ARABIC_LETTERS.contains(ch)) {
            context.insert(LANGUAGE_KEY, LANGUAGE_ARABIC);
        }
        context
    }

    async fn before_response(
        &self,
        _user_id: &str,
        response: String,
        context: &PluginContext,
    ) -> String {
        if context.get_str(LANGUAGE_KEY) != Some(LANGUAGE_ARABIC) {
            return response;
        }
        response
            .replace("ه ", &format!("ه{RLM} "))
            .replace("ة ", &format!("ة{RLM} "))
    }
}

#[cfg(test)]
mod tests {
    use super::ArabicScriptPlugin;
    use crate::plugins::{Plugin, PluginContext};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn tags_arabic_messages_only() {
        let plugin = ArabicScriptPlugin;
        let tagged = plugin
            .on_message("u", "مرحبا", PluginContext::new())
            .await;
        assert_eq!(tagged.get_str("language"), Some("arabic"));

        let untagged = plugin
            .on_message("u", "hello", PluginContext::new())
            .await;
        assert!(!untagged.contains_key("language"));
    }

    #[tokio::test]
    async fn inserts_marks_when_tagged() {
        let plugin = ArabicScriptPlugin;
        let mut context = PluginContext::new();
        context.insert("language", "arabic");
        let response = plugin
            .before_response("u", "مدرسة كبيرة جدا".to_string(), &context)
            .await;
        assert_eq!(response, "مدرسة\u{200F} كبيرة\u{200F} جدا");

        let plain = plugin
            .before_response("u", "مدرسة كبيرة".to_string(), &PluginContext::new())
            .await;
        assert_eq!(plain, "مدرسة كبيرة");
    }
}
