use crate::server::run_translation;
use crate::state::AppState;
use crate::utils::SheetTranslatorError;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "Parameters for translating a spreadsheet")]
pub struct TranslateWorkbookParams {
    #[schemars(description = "Path to the xlsx, xlsm, xls, ods or csv file to translate")]
    pub input_file: String,
    #[schemars(description = "Where to save the result (default: <output dir>/<name>_translated.<ext>)")]
    pub output_file: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "A term base entry")]
pub struct AddTermParams {
    #[schemars(description = "Chinese term")]
    pub term: String,
    #[schemars(description = "English translation used whenever the term appears as a whole cell")]
    pub translation: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "Term to remove from the term base")]
pub struct RemoveTermParams {
    #[schemars(description = "Chinese term")]
    pub term: String,
}

fn to_mcp_error(e: SheetTranslatorError) -> McpError {
    match e {
        SheetTranslatorError::UnsupportedFileType(_)
        | SheetTranslatorError::FileNotFound(_)
        | SheetTranslatorError::ValidationError(_)
        | SheetTranslatorError::TermNotFound(_) => McpError::invalid_params(e.to_string(), None),
        _ => McpError::internal_error(e.to_string(), None),
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

#[derive(Clone)]
pub struct SheetTranslatorServer {
    state: AppState,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SheetTranslatorServer {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "translate_workbook",
        description = "Translate every Chinese or English text cell of a spreadsheet, writing 'original\\ntranslation' into each cell. URLs, codes, numbers, dates and already translated cells are left untouched. Returns the output path and per-run statistics."
    )]
    async fn translate_workbook(
        &self,
        params: Parameters<TranslateWorkbookParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;

        let output_file = params.output_file.as_deref().map(Path::new);
        let report = run_translation(&self.state, &params.input_file, output_file)
            .await
            .map_err(to_mcp_error)?;

        json_result(&report)
    }

    #[tool(
        name = "list_terms",
        description = "Return the whole term base as a JSON object of Chinese term -> English translation."
    )]
    async fn list_terms(&self) -> Result<CallToolResult, McpError> {
        let term_base = self.state.term_store.list();
        json_result(&term_base)
    }

    #[tool(
        name = "add_term",
        description = "Add or replace a term base entry. Takes effect on the next translation run."
    )]
    async fn add_term(&self, params: Parameters<AddTermParams>) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let _guard = self.state.run_lock.lock().await;

        let term_base = self
            .state
            .term_store
            .add(&params.term, &params.translation)
            .map_err(to_mcp_error)?;

        json_result(&serde_json::json!({
            "success": true,
            "message": "Term added",
            "terms": term_base.len(),
        }))
    }

    #[tool(name = "remove_term", description = "Remove a term base entry.")]
    async fn remove_term(
        &self,
        params: Parameters<RemoveTermParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let _guard = self.state.run_lock.lock().await;

        let term_base = self
            .state
            .term_store
            .remove(&params.term)
            .map_err(to_mcp_error)?;

        json_result(&serde_json::json!({
            "success": true,
            "message": "Term removed",
            "terms": term_base.len(),
        }))
    }

    pub fn router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }
}

#[tool_handler]
impl rmcp::handler::server::ServerHandler for SheetTranslatorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                r#"Sheet Translator MCP Server

Tools:
1. translate_workbook - translate a local spreadsheet (absolute paths)
2. list_terms / add_term / remove_term - manage the term base

Cells become "original\ntranslation". Failed cells carry a bracketed marker
such as "[Translation timeout] original" so they can be found afterwards.
Running translate_workbook again on its own output changes nothing."#
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::MockTranslator;
    use crate::utils::AppConfig;
    use std::sync::Arc;

    fn server(dir: &tempfile::TempDir) -> SheetTranslatorServer {
        let mut config = AppConfig::default();
        config.term_base.path = dir.path().join("term_base.json");
        config.output.directory = dir.path().join("out");
        config.translation.request_delay_ms = 0;
        SheetTranslatorServer::new(AppState::new(config, Arc::new(MockTranslator::tagged())))
    }

    #[test]
    fn registers_all_tools() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(&dir);
        let names: Vec<String> = server
            .router()
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();

        for expected in ["translate_workbook", "list_terms", "add_term", "remove_term"] {
            assert!(names.iter().any(|n| n == expected), "missing {}", expected);
        }
    }

    #[tokio::test]
    async fn translate_tool_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("names.csv");
        std::fs::write(&input, "你好,https://example.com\n").unwrap();
        let server = server(&dir);

        let result = server
            .translate_workbook(Parameters(TranslateWorkbookParams {
                input_file: input.display().to_string(),
                output_file: None,
            }))
            .await
            .unwrap();

        assert_ne!(result.is_error, Some(true));
        let output = dir.path().join("out").join("names_translated.csv");
        let written = std::fs::read_to_string(output).unwrap();
        assert_eq!(written, "\"你好\nen:你好\",https://example.com\n");
    }

    #[tokio::test]
    async fn unsupported_input_is_invalid_params() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(&dir);

        let err = server
            .translate_workbook(Parameters(TranslateWorkbookParams {
                input_file: "/tmp/notes.docx".to_string(),
                output_file: None,
            }))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn term_tools_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(&dir);

        server
            .add_term(Parameters(AddTermParams {
                term: "项目".to_string(),
                translation: "Project".to_string(),
            }))
            .await
            .unwrap();
        assert_eq!(server.state.term_store.load().get("项目"), Some("Project"));

        server
            .remove_term(Parameters(RemoveTermParams {
                term: "项目".to_string(),
            }))
            .await
            .unwrap();
        assert!(server.state.term_store.load().is_empty());

        let err = server
            .remove_term(Parameters(RemoveTermParams {
                term: "项目".to_string(),
            }))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }
}
