// Core data models for the notebook directory and deck export

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::layout::SlideLayout;

/// Default notebook color (blue)
pub const DEFAULT_NOTEBOOK_COLOR: &str = "#3B82F6";

/// Default notebook icon
pub const DEFAULT_NOTEBOOK_ICON: &str = "book";

/// Colors offered by the notebook form
pub const NOTEBOOK_COLOR_PALETTE: [&str; 8] = [
    "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899", "#06B6D4", "#6B7280",
];

/// Current time as Unix milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Notebook ID (first 8 hex chars of a UUID v4)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotebookId(pub String);

impl NotebookId {
    /// Generate a new random notebook ID
    pub fn new() -> Self {
        let simple = uuid::Uuid::new_v4().simple().to_string();
        Self(simple[..8].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NotebookId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NotebookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotebookId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Kind of content saved into a notebook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Solve,
    Question,
    Research,
    CoWriter,
    Chat,
    Note,
}

impl RecordType {
    pub const ALL: [RecordType; 6] = [
        RecordType::Solve,
        RecordType::Question,
        RecordType::Research,
        RecordType::CoWriter,
        RecordType::Chat,
        RecordType::Note,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::Solve => "solve",
            RecordType::Question => "question",
            RecordType::Research => "research",
            RecordType::CoWriter => "co_writer",
            RecordType::Chat => "chat",
            RecordType::Note => "note",
        }
    }
}

/// Single record stored in a notebook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookRecord {
    pub id: String,

    #[serde(rename = "type")]
    pub record_type: RecordType,

    pub title: String,

    pub user_query: String,

    pub output: String,

    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    #[serde(default)]
    pub kb_name: Option<String>,
}

impl NotebookRecord {
    pub fn new(
        record_type: RecordType,
        title: String,
        user_query: String,
        output: String,
        metadata: serde_json::Map<String, serde_json::Value>,
        kb_name: Option<String>,
    ) -> Self {
        Self {
            id: NotebookId::new().0,
            record_type,
            title,
            user_query,
            output,
            metadata,
            created_at: now_millis(),
            kb_name,
        }
    }
}

/// Notebook with all of its records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    /// Unique, immutable identifier
    pub id: NotebookId,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds), never before `created_at`
    pub updated_at: i64,

    #[serde(default)]
    pub records: Vec<NotebookRecord>,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_icon")]
    pub icon: String,
}

fn default_color() -> String {
    DEFAULT_NOTEBOOK_COLOR.to_string()
}

fn default_icon() -> String {
    DEFAULT_NOTEBOOK_ICON.to_string()
}

impl Notebook {
    /// Create an empty notebook
    pub fn new(name: String, description: String, color: String, icon: String) -> Self {
        let now = now_millis();
        Self {
            id: NotebookId::new(),
            name,
            description,
            created_at: now,
            updated_at: now,
            records: Vec::new(),
            color,
            icon,
        }
    }

    /// Bump `updated_at`, keeping it monotonic
    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at).max(self.created_at);
    }

    pub fn summary(&self) -> NotebookSummary {
        NotebookSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            record_count: self.records.len(),
            color: self.color.clone(),
            icon: self.icon.clone(),
        }
    }

    /// Markdown source handed to outline generation
    pub fn export_source(&self) -> String {
        let mut source = format!("# {}\n", self.name);
        if !self.description.trim().is_empty() {
            source.push_str(&format!("\n{}\n", self.description.trim()));
        }
        for record in &self.records {
            source.push_str(&format!("\n## {}\n\n{}\n", record.title, record.output.trim()));
        }
        source
    }
}

/// Notebook list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookSummary {
    pub id: NotebookId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub record_count: usize,
    pub color: String,
    pub icon: String,
}

/// One page of a deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub title: String,

    #[serde(default)]
    pub points: Vec<String>,

    #[serde(default)]
    pub layout: SlideLayout,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,

    /// Resolved image (data URL or cached file path)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_image_url: Option<String>,
}

impl Slide {
    pub fn new(title: impl Into<String>, points: Vec<String>, layout: SlideLayout) -> Self {
        Self {
            title: title.into(),
            points,
            layout,
            image_prompt: None,
            generated_image_url: None,
        }
    }

    /// Copy with a new title; everything else unchanged
    pub fn with_title(&self, title: String) -> Self {
        Self {
            title,
            ..self.clone()
        }
    }

    /// Copy with bullet `index` replaced; order and length of the rest kept.
    /// Out-of-range indices return an unchanged copy.
    pub fn with_point(&self, index: usize, text: String) -> Self {
        let mut points = self.points.clone();
        if let Some(point) = points.get_mut(index) {
            *point = text;
        }
        Self {
            points,
            ..self.clone()
        }
    }

    pub fn with_layout(&self, layout: SlideLayout) -> Self {
        Self {
            layout,
            ..self.clone()
        }
    }

    pub fn with_image(&self, image_url: Option<String>) -> Self {
        Self {
            generated_image_url: image_url,
            ..self.clone()
        }
    }

    /// Prompt to send for image generation, if any
    pub fn pending_prompt(&self) -> Option<&str> {
        match (&self.image_prompt, &self.generated_image_url) {
            (Some(prompt), None) if !prompt.trim().is_empty() => Some(prompt.as_str()),
            _ => None,
        }
    }
}

/// Full exportable presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub title: String,

    #[serde(default)]
    pub subtitle: String,

    pub theme_color: String,

    pub accent_color: String,

    #[serde(default)]
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Copy with slide `index` replaced by value
    pub fn with_slide(&self, index: usize, slide: Slide) -> Self {
        let mut slides = self.slides.clone();
        if let Some(existing) = slides.get_mut(index) {
            *existing = slide;
        }
        Self {
            slides,
            ..self.clone()
        }
    }
}

/// Style template entry (free-form string map)
pub type StyleTemplate = BTreeMap<String, String>;

/// Decode a `data:<mime>;base64,<payload>` URL
pub fn decode_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    use base64::Engine;

    let rest = url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mut parts = header.split(';');
    let mime = parts.next().filter(|m| !m.is_empty()).unwrap_or("text/plain");
    if !parts.any(|p| p.eq_ignore_ascii_case("base64")) {
        return None;
    }
    let data = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .ok()?;
    Some((mime.to_string(), data))
}

/// Encode bytes as a base64 data URL (for img src attribute)
pub fn encode_data_url(mime: &str, data: &[u8]) -> String {
    use base64::Engine;
    let base64_data = base64::engine::general_purpose::STANDARD.encode(data);
    format!("data:{};base64,{}", mime, base64_data)
}

/// Status level for messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusLevel {
    /// 処理が正常に完了
    Info,
    /// 問題が発生したが処理は続行可能
    Warning,
    /// エラーが発生し処理が失敗
    Error,
}

/// Result codes shown in the UI message bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // 正常完了
    NotebookCreated,
    NotebookUpdated,
    NotebookDeleted,
    OutlineReady,
    ExportOk,

    // バリデーションエラー (WARNING)
    ValidationEmpty,
    ValidationTextLimit,
    ValidationColor,
    ImageGenerationFailed,
    FeatureDisabled,

    // 処理エラー (ERROR)
    OutlineError,
    ExportError,
    NotFound,

    // サーバー・ネットワークエラー (ERROR)
    ServerError,
    NetworkError,
    InvalidResponse,
}

impl ErrorCode {
    pub fn level(&self) -> StatusLevel {
        match self {
            ErrorCode::NotebookCreated
            | ErrorCode::NotebookUpdated
            | ErrorCode::NotebookDeleted
            | ErrorCode::OutlineReady
            | ErrorCode::ExportOk => StatusLevel::Info,
            ErrorCode::ValidationEmpty
            | ErrorCode::ValidationTextLimit
            | ErrorCode::ValidationColor
            | ErrorCode::ImageGenerationFailed
            | ErrorCode::FeatureDisabled => StatusLevel::Warning,
            ErrorCode::OutlineError
            | ErrorCode::ExportError
            | ErrorCode::NotFound
            | ErrorCode::ServerError
            | ErrorCode::NetworkError
            | ErrorCode::InvalidResponse => StatusLevel::Error,
        }
    }

    /// Default user-facing text (no context)
    pub fn to_message(&self) -> &'static str {
        match self {
            ErrorCode::NotebookCreated => "ノートブックを作成しました",
            ErrorCode::NotebookUpdated => "ノートブックを更新しました",
            ErrorCode::NotebookDeleted => "ノートブックを削除しました",
            ErrorCode::OutlineReady => "スライド構成を生成しました",
            ErrorCode::ExportOk => "PPTXファイルを出力しました",
            ErrorCode::ValidationEmpty => "必須項目を入力してください",
            ErrorCode::ValidationTextLimit => "入力内容が長すぎます",
            ErrorCode::ValidationColor => "カラーコードは#RRGGBB形式で入力してください",
            ErrorCode::ImageGenerationFailed => "一部のスライド画像を生成できませんでした",
            ErrorCode::FeatureDisabled => "スライド出力機能は無効になっています",
            ErrorCode::OutlineError => "スライド構成の生成に失敗しました。再度お試しください",
            ErrorCode::ExportError => "PPTXファイルの出力に失敗しました。再度お試しください",
            ErrorCode::NotFound => "対象のノートブックが見つかりません",
            ErrorCode::ServerError => {
                "サーバーが応答していません。時間をおいて再度接続を試すか管理者に問い合わせてください"
            }
            ErrorCode::NetworkError => "ネットワーク接続に失敗しました。接続をご確認ください",
            ErrorCode::InvalidResponse => "サーバーの応答を解析できませんでした",
        }
    }
}

/// Processing result information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Status level (INFO/WARNING/ERROR)
    pub level: StatusLevel,

    pub code: ErrorCode,

    /// Optional additional context (e.g., slide index, max length)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl ProcessResult {
    pub fn success(code: ErrorCode) -> Self {
        Self {
            level: code.level(),
            code,
            context: None,
        }
    }

    pub fn error(code: ErrorCode) -> Self {
        Self {
            level: code.level(),
            code,
            context: None,
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }
}

/// API Request: POST /api/v1/notebook/create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateNotebookRequest {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_icon")]
    pub icon: String,
}

impl CreateNotebookRequest {
    pub fn validate(&self) -> Result<(), crate::validation::ValidationError> {
        crate::validation::validate_notebook_name(&self.name)?;
        crate::validation::validate_description(&self.description)?;
        crate::validation::validate_color(&self.color)
    }
}

/// API Request: PUT /api/v1/notebook/{id} (fields left out are unchanged)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateNotebookRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl UpdateNotebookRequest {
    pub fn validate(&self) -> Result<(), crate::validation::ValidationError> {
        if let Some(name) = &self.name {
            crate::validation::validate_notebook_name(name)?;
        }
        if let Some(description) = &self.description {
            crate::validation::validate_description(description)?;
        }
        if let Some(color) = &self.color {
            crate::validation::validate_color(color)?;
        }
        Ok(())
    }
}

/// API Response: GET /api/v1/notebook/list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotebookListResponse {
    pub notebooks: Vec<NotebookSummary>,
    pub total: usize,
}

/// API Response: create / update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotebookMutationResponse {
    #[serde(default)]
    pub success: bool,
    pub notebook: Option<Notebook>,
}

/// API Response: delete / remove record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// API Request: POST /api/v1/notebook/add_record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRecordRequest {
    pub notebook_ids: Vec<NotebookId>,
    pub record_type: RecordType,
    pub title: String,
    pub user_query: String,
    pub output: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub kb_name: Option<String>,
}

/// API Response: POST /api/v1/notebook/add_record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRecordResponse {
    pub success: bool,
    pub record: NotebookRecord,
    pub added_to_notebooks: Vec<NotebookId>,
}

/// API Request: POST /api/v1/notebook/{id}/records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleRecordRequest {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub title: String,
    #[serde(default)]
    pub user_query: String,
    pub output: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub kb_name: Option<String>,
}

/// API Response: POST /api/v1/notebook/{id}/records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleRecordResponse {
    pub success: bool,
    pub record: NotebookRecord,
}

/// API Response: GET /api/v1/notebook/statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotebookStatistics {
    pub total_notebooks: usize,
    pub total_records: usize,
    pub records_by_type: BTreeMap<RecordType, usize>,
    pub recent_notebooks: Vec<NotebookSummary>,
}

/// Fallback title for notes with no usable text
pub const DEFAULT_NOTE_TITLE: &str = "New Note";

const NOTE_TITLE_CHARS: usize = 30;

/// Title from the first line of a note, cut at 30 characters
pub fn suggest_note_title(content: &str) -> String {
    let first_line = content.trim().lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        return DEFAULT_NOTE_TITLE.to_string();
    }
    if first_line.chars().count() > NOTE_TITLE_CHARS {
        let cut: String = first_line.chars().take(NOTE_TITLE_CHARS).collect();
        format!("{}...", cut)
    } else {
        first_line.to_string()
    }
}

/// API Request: POST /api/v1/notebook/generate_title
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateTitleRequest {
    #[serde(default)]
    pub content: String,
}

/// API Response: POST /api/v1/notebook/generate_title
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateTitleResponse {
    pub title: String,
}

/// API Request: POST /api/v1/research/ppt_outline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineRequest {
    pub source_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_slides: Option<u32>,
}

/// API Request: POST /api/v1/research/ppt_image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
}

/// API Response: POST /api/v1/research/ppt_image
///
/// An empty `image_data_url` means no image was produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageResponse {
    #[serde(default)]
    pub image_data_url: String,
    #[serde(default)]
    pub cached: bool,
}

/// Outline tunables exposed by GET /api/v1/research/ppt_config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineTunables {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Image settings exposed by GET /api/v1/research/ppt_config (no secrets)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageTunables {
    pub model: String,
    pub binding: String,
    pub aspect_ratio: String,
}

/// API Response: GET /api/v1/research/ppt_config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckConfigResponse {
    pub enabled: bool,
    pub max_slides: u32,
    #[serde(default)]
    pub style_templates: Vec<StyleTemplate>,
    pub outline: OutlineTunables,
    pub image: ImageTunables,
}

/// API Response: GET /api/v1/research/ppt_style_templates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleTemplatesResponse {
    #[serde(default)]
    pub templates: Vec<StyleTemplate>,
}

/// API Error Response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    /// Optional error details (for debugging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
