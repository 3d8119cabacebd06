//! Prompt assembly for the editor's chat assistant

use crate::core_types::{AssistantRequest, ChatMessage, ChatRole};

pub const SYSTEM_INSTRUCTION: &str = "You are an expert programming assistant embedded in a live code editor called LiveCode+.
Your role is to help developers write, debug, optimize, and understand code.

Guidelines:
- Be concise but thorough in your explanations.
- When suggesting code changes, show the specific code with proper formatting.
- Use markdown formatting: **bold** for emphasis, `inline code`, and ```language for code blocks.
- If the user shares code, analyze it carefully before responding.
- Point out bugs, performance issues, and best practices.
- When asked to optimize, explain what you changed and why.
- Suggest tests when appropriate.
- Be friendly and encouraging.";

/// The text of the current user turn: editor contents (when non-blank) followed by the message.
pub fn build_user_turn(message: &str, code: Option<&str>, language: Option<&str>) -> String {
    let mut prompt = String::new();

    if let Some(code) = code.filter(|c| !c.trim().is_empty()) {
        let label = language.filter(|l| !l.is_empty());
        prompt.push_str(&format!(
            "The user is currently working with {} in the editor. Here is their current code:\n\n```{}\n{}\n```\n\n",
            label.unwrap_or("code"),
            label.unwrap_or(""),
            code
        ));
    }

    prompt.push_str("User message: ");
    prompt.push_str(message);
    prompt
}

/// Prior history followed by the current user turn, in send order.
pub fn build_conversation(request: &AssistantRequest) -> Vec<ChatMessage> {
    let mut turns = request.history.clone();
    turns.push(ChatMessage {
        role: ChatRole::User,
        content: build_user_turn(
            &request.message,
            request.current_code.as_deref(),
            request.language.as_deref(),
        ),
    });
    turns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_only() {
        assert_eq!(build_user_turn("hi", None, None), "User message: hi");
        assert_eq!(build_user_turn("hi", Some("   \n"), Some("python")), "User message: hi");
    }

    #[test]
    fn test_code_context_block() {
        let turn = build_user_turn("why?", Some("print(1)"), Some("python"));
        assert_eq!(
            turn,
            "The user is currently working with python in the editor. Here is their current code:\n\n```python\nprint(1)\n```\n\nUser message: why?"
        );
    }

    #[test]
    fn test_code_without_language() {
        let turn = build_user_turn("why?", Some("x = 1"), None);
        assert!(turn.starts_with("The user is currently working with code in the editor."));
        assert!(turn.contains("```\nx = 1\n```"));
    }

    #[test]
    fn test_conversation_appends_current_turn() {
        let request = AssistantRequest {
            message: "and now?".to_string(),
            current_code: None,
            language: None,
            history: vec![
                ChatMessage { role: ChatRole::User, content: "first".to_string() },
                ChatMessage { role: ChatRole::Assistant, content: "answer".to_string() },
            ],
        };
        let turns = build_conversation(&request);
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1].role, ChatRole::Assistant);
        assert_eq!(turns[2].role, ChatRole::User);
        assert_eq!(turns[2].content, "User message: and now?");
    }
}
