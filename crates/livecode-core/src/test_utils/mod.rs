pub mod mock_gemini_server;
pub mod mock_judge0_server;
