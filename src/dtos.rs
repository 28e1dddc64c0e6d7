use std::collections::HashMap;

use crate::generation::{ContentType, Course, CourseLevel, Difficulty, NewsArticle, Tutorial};
use crate::models::{
    Category, NewsItem, Pricing, Tool, ToolDraft, ToolStatus, UserProfile, UserRole,
};
use crate::utils::rating::ReviewStats;
use crate::utils::slug::{slugify, validate_derived_slug, validate_slug, validate_slug_or_empty};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// DTOs define exactly what crosses the HTTP boundary. Row shapes coming back
// from joins also live here since they never map 1:1 onto a table.

/// Shown wherever a joined tool or reviewer row no longer exists.
pub const DELETED_PLACEHOLDER: &str = "deleted";

/// Shown when the privileged identity lookup has no email for a profile.
pub const EMAIL_UNAVAILABLE: &str = "N/A";

/// Generic success response
#[derive(Serialize)]
pub struct Response {
    pub status: &'static str,
    pub message: String,
}

// ============================================================================
// Tool DTOs
// ============================================================================

/// Catalog row: a tool joined with its category and aggregated review figures.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ToolSummaryDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub url: String,
    pub image_url: Option<String>,
    pub pricing: Pricing,
    pub platforms: Vec<String>,
    pub verified: bool,
    pub featured: bool,
    pub status: ToolStatus,
    pub created_at: DateTime<Utc>,
    pub category_id: Uuid,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    /// Mean rating rounded to one decimal, 0 without reviews.
    pub rating: f64,
    pub review_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolListResponseDto {
    pub status: String,
    pub data: Vec<ToolSummaryDto>,
    pub results: usize,
}

/// Review as listed under a tool, with the reviewer's display name.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ToolReviewDto {
    pub id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewer_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolDetailDto {
    #[serde(flatten)]
    pub tool: Tool,
    pub category_name: Option<String>,
    pub rating: f64,
    pub review_count: usize,
    pub reviews: Vec<ToolReviewDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolDetailResponseDto {
    pub status: String,
    pub data: ToolDetailDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolResponseDto {
    pub status: String,
    pub data: Tool,
}

/// Public catalog filters.
#[derive(Debug, Deserialize, Validate)]
pub struct CatalogQueryParams {
    pub category: Option<String>,

    pub featured: Option<bool>,

    /// Blank means no search.
    #[validate(length(max = 100))]
    pub q: Option<String>,
}

/// Admin listing filter; `all` (or no value) lists every status.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Approved,
    Rejected,
}

impl StatusFilter {
    pub fn as_status(self) -> Option<ToolStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Pending => Some(ToolStatus::Pending),
            StatusFilter::Approved => Some(ToolStatus::Approved),
            StatusFilter::Rejected => Some(ToolStatus::Rejected),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminToolsQuery {
    pub status: Option<StatusFilter>,
}

#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCountsDto {
    pub all: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

impl StatusCountsDto {
    pub fn from_rows(rows: &[(ToolStatus, i64)]) -> Self {
        rows.iter()
            .fold(StatusCountsDto::default(), |mut counts, (status, n)| {
                counts.all += n;
                match status {
                    ToolStatus::Pending => counts.pending += n,
                    ToolStatus::Approved => counts.approved += n,
                    ToolStatus::Rejected => counts.rejected += n,
                }
                counts
            })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminToolListResponseDto {
    pub status: String,
    pub data: Vec<ToolSummaryDto>,
    pub counts: StatusCountsDto,
}

/// Admin create/update body (full editable field set).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "input_tool_has_slug"))]
pub struct InputToolDto {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,

    /// Derived from `name` when left empty.
    #[validate(custom(function = "validate_slug_or_empty"))]
    pub slug: Option<String>,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub long_description: Option<String>,

    #[validate(url(message = "URL is invalid"))]
    pub url: String,

    #[validate(url(message = "Image URL is invalid"))]
    pub image_url: Option<String>,

    pub category_id: Uuid,

    #[serde(default)]
    pub pricing: Pricing,

    #[serde(default)]
    pub platforms: Vec<String>,

    #[serde(default)]
    pub verified: bool,

    #[serde(default)]
    pub featured: bool,

    /// Admin-created tools default to `approved`.
    pub status: Option<ToolStatus>,
}

fn input_tool_has_slug(dto: &InputToolDto) -> Result<(), ValidationError> {
    validate_derived_slug(&dto.resolved_slug())
}

impl InputToolDto {
    fn resolved_slug(&self) -> String {
        match self.slug.as_deref() {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => slugify(&self.name),
        }
    }

    pub fn into_draft(self, submitted_by: Option<Uuid>) -> ToolDraft {
        let slug = self.resolved_slug();
        ToolDraft {
            name: self.name,
            slug,
            description: self.description,
            long_description: self.long_description,
            url: self.url,
            image_url: self.image_url,
            category_id: self.category_id,
            pricing: self.pricing,
            platforms: self.platforms,
            verified: self.verified,
            featured: self.featured,
            status: self.status.unwrap_or(ToolStatus::Approved),
            submitted_by,
        }
    }
}

/// Public submission body. Moderation fields are not accepted here.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "submitted_tool_has_slug"))]
pub struct SubmitToolDto {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub long_description: Option<String>,

    #[validate(url(message = "URL is invalid"))]
    pub url: String,

    #[validate(url(message = "Image URL is invalid"))]
    pub image_url: Option<String>,

    pub category_id: Uuid,

    #[serde(default)]
    pub pricing: Pricing,

    #[serde(default)]
    pub platforms: Vec<String>,
}

fn submitted_tool_has_slug(dto: &SubmitToolDto) -> Result<(), ValidationError> {
    validate_derived_slug(&slugify(&dto.name))
}

impl SubmitToolDto {
    pub fn into_draft(self, submitter: Uuid) -> ToolDraft {
        ToolDraft {
            slug: slugify(&self.name),
            name: self.name,
            description: self.description,
            long_description: self.long_description,
            url: self.url,
            image_url: self.image_url,
            category_id: self.category_id,
            pricing: self.pricing,
            platforms: self.platforms,
            verified: false,
            featured: false,
            status: ToolStatus::Pending,
            submitted_by: Some(submitter),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolStatusUpdateDto {
    pub status: ToolStatus,
}

/// Row for the dashboard's "recent tools" panel.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecentToolDto {
    pub id: Uuid,
    pub name: String,
    pub status: ToolStatus,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub category_name: Option<String>,
}

// ============================================================================
// Category DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub icon: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Approved tools in this category.
    pub tool_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryListResponseDto {
    pub status: String,
    pub data: Vec<CategoryDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponseDto {
    pub status: String,
    pub data: Category,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryToolsResponseDto {
    pub status: String,
    pub category: Category,
    pub tools: Vec<ToolSummaryDto>,
}

/// Category create/update body. The slug is stored exactly as sent once it
/// passes the `[a-z0-9-]+` check.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InputCategoryDto {
    #[validate(length(min = 1, max = 80, message = "Name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Slug is required"),
        custom(function = "validate_slug")
    )]
    pub slug: String,

    #[validate(length(min = 1, max = 64))]
    pub icon: Option<String>,

    pub description: Option<String>,
}

impl InputCategoryDto {
    pub fn icon_or_default(&self) -> &str {
        self.icon.as_deref().unwrap_or("FolderOpen")
    }
}

// ============================================================================
// Review DTOs
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct InputReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(max = 500, message = "Comment must be at most 500 characters"))]
    pub comment: Option<String>,
}

impl InputReviewRequest {
    /// Trimmed comment; blank comments are stored as NULL.
    pub fn normalized_comment(&self) -> Option<String> {
        self.comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Serialize)]
pub struct SingleReviewResponse {
    pub status: String,
    pub data: crate::models::Review,
}

#[derive(Debug, Serialize)]
pub struct ToolReviewListResponse {
    pub status: String,
    pub data: Vec<ToolReviewDto>,
}

/// Moderation row: review left-joined with its tool and reviewer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminReviewRow {
    pub id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub tool_id: Option<Uuid>,
    pub tool_name: Option<String>,
    pub tool_slug: Option<String>,
    pub reviewer_id: Option<Uuid>,
    pub reviewer_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewToolRef {
    pub id: Option<Uuid>,
    pub name: String,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewerRef {
    pub id: Option<Uuid>,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminReviewDto {
    pub id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub tool: ReviewToolRef,
    pub user: ReviewerRef,
}

impl From<AdminReviewRow> for AdminReviewDto {
    fn from(row: AdminReviewRow) -> Self {
        AdminReviewDto {
            id: row.id,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
            tool: ReviewToolRef {
                id: row.tool_id,
                name: row
                    .tool_name
                    .unwrap_or_else(|| DELETED_PLACEHOLDER.to_string()),
                slug: row.tool_slug,
            },
            user: ReviewerRef {
                id: row.reviewer_id,
                display_name: row
                    .reviewer_name
                    .unwrap_or_else(|| DELETED_PLACEHOLDER.to_string()),
            },
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdminReviewsQuery {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct AdminReviewListResponse {
    pub status: String,
    pub data: Vec<AdminReviewDto>,
    pub stats: ReviewStats,
}

// ============================================================================
// User DTOs
// ============================================================================

/// Profile as listed in the back office, enriched with the identity email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminUserDto {
    pub id: Uuid,
    pub display_name: String,
    pub role: UserRole,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub email: String,
}

impl AdminUserDto {
    /// Attach emails from the identity lookup. Without a lookup result, or
    /// without a match, the email reads "N/A".
    pub fn merge_emails(
        profiles: Vec<UserProfile>,
        emails: Option<&HashMap<Uuid, String>>,
    ) -> Vec<AdminUserDto> {
        profiles
            .into_iter()
            .map(|profile| {
                let email = emails
                    .and_then(|by_id| by_id.get(&profile.id))
                    .cloned()
                    .unwrap_or_else(|| EMAIL_UNAVAILABLE.to_string());
                AdminUserDto {
                    id: profile.id,
                    display_name: profile.display_name,
                    role: profile.role,
                    avatar_url: profile.avatar_url,
                    created_at: profile.created_at,
                    email,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoleFilter {
    #[default]
    All,
    User,
    Admin,
}

impl RoleFilter {
    pub fn as_role(self) -> Option<UserRole> {
        match self {
            RoleFilter::All => None,
            RoleFilter::User => Some(UserRole::User),
            RoleFilter::Admin => Some(UserRole::Admin),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminUsersQuery {
    pub role: Option<RoleFilter>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponseDto {
    pub status: String,
    pub users: Vec<AdminUserDto>,
    pub results: usize,
}

#[derive(Debug, Serialize)]
pub struct UserResponseDto {
    pub status: String,
    pub data: UserProfile,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct UserUpdateDto {
    #[validate(length(min = 1, max = 80, message = "Display name is required"))]
    pub display_name: String,

    pub role: UserRole,
}

/// Sign-up profile creation. The role is always `user`.
#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfileDto {
    #[validate(length(min = 1, max = 80, message = "Display name is required"))]
    pub display_name: String,

    #[validate(url(message = "Avatar URL is invalid"))]
    pub avatar_url: Option<String>,
}

// ============================================================================
// Dashboard & stats DTOs
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardStatsDto {
    pub approved_tools: i64,
    pub pending_tools: i64,
    pub total_users: i64,
    pub total_reviews: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponseDto {
    pub status: String,
    pub stats: DashboardStatsDto,
    pub recent_tools: Vec<RecentToolDto>,
}

#[derive(Debug, Serialize)]
pub struct SiteStatsResponseDto {
    pub status: String,
    pub tools: i64,
    pub categories: i64,
}

// ============================================================================
// Content generation DTOs
// ============================================================================

// Field presence is checked by the handlers, not by serde, so a missing field
// answers with the service's own "... is required" message.

#[derive(Debug, Deserialize)]
pub struct GenerateContentRequest {
    #[serde(rename = "toolId")]
    pub tool_id: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<ContentType>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateNewsRequest {
    pub topic: Option<String>,
    #[serde(rename = "toolId")]
    pub tool_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateTutorialRequest {
    #[serde(rename = "toolId")]
    pub tool_id: Option<String>,
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateCourseRequest {
    #[serde(rename = "toolId")]
    pub tool_id: Option<String>,
    pub level: Option<CourseLevel>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateAllRequest {
    #[serde(rename = "toolId")]
    pub tool_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratedContentResponse {
    pub success: bool,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratedNewsResponse {
    pub success: bool,
    pub news: NewsArticle,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratedTutorialResponse {
    pub success: bool,
    pub tutorial: Tutorial,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratedCourseResponse {
    pub success: bool,
    pub course: Course,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratedBundle {
    pub description: String,
    pub news: NewsArticle,
    pub tutorial: Tutorial,
    pub course: Course,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratedAllResponse {
    pub success: bool,
    pub data: GeneratedBundle,
}

/// OpenAI-style chat completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    pub content: Option<String>,
}

/// A news article with its tag list split out.
#[derive(Debug, Serialize)]
pub struct NewsItemDto {
    #[serde(flatten)]
    pub item: NewsItem,
    pub categories: Vec<String>,
}

impl From<NewsItem> for NewsItemDto {
    fn from(item: NewsItem) -> Self {
        let categories = item
            .category
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();
        NewsItemDto { item, categories }
    }
}

#[derive(Debug, Serialize)]
pub struct NewsResponseDto {
    pub status: String,
    pub data: NewsItemDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, role: UserRole) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            role,
            display_name: name.to_string(),
            avatar_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn emails_default_to_na_without_lookup() {
        let users = AdminUserDto::merge_emails(vec![profile("ana", UserRole::User)], None);
        assert_eq!(users[0].email, EMAIL_UNAVAILABLE);
    }

    #[test]
    fn emails_merge_by_profile_id() {
        let known = profile("ana", UserRole::Admin);
        let unknown = profile("bo", UserRole::User);
        let mut emails = HashMap::new();
        emails.insert(known.id, "ana@example.com".to_string());

        let users = AdminUserDto::merge_emails(vec![known, unknown], Some(&emails));
        assert_eq!(users[0].email, "ana@example.com");
        assert_eq!(users[0].role, UserRole::Admin);
        assert_eq!(users[1].email, EMAIL_UNAVAILABLE);
    }

    #[test]
    fn reviews_of_deleted_rows_keep_a_placeholder() {
        let row = AdminReviewRow {
            id: Uuid::new_v4(),
            rating: 2,
            comment: Some("meh".into()),
            created_at: Utc::now(),
            tool_id: None,
            tool_name: None,
            tool_slug: None,
            reviewer_id: None,
            reviewer_name: None,
        };
        let dto = AdminReviewDto::from(row);
        assert_eq!(dto.tool.name, DELETED_PLACEHOLDER);
        assert_eq!(dto.user.display_name, DELETED_PLACEHOLDER);
        assert_eq!(dto.rating, 2);
    }

    #[test]
    fn status_counts_fold_group_rows() {
        let counts = StatusCountsDto::from_rows(&[
            (ToolStatus::Approved, 4),
            (ToolStatus::Pending, 2),
        ]);
        assert_eq!(
            counts,
            StatusCountsDto {
                all: 6,
                pending: 2,
                approved: 4,
                rejected: 0
            }
        );
    }

    #[test]
    fn admin_created_tools_default_to_approved() {
        let body: InputToolDto = serde_json::from_value(serde_json::json!({
            "name": "Eleven Labs",
            "description": "Realistic AI voices",
            "url": "https://elevenlabs.io",
            "category_id": Uuid::new_v4(),
            "pricing": "Freemium",
            "platforms": ["Web"]
        }))
        .unwrap();
        assert!(body.validate().is_ok());

        let draft = body.into_draft(None);
        assert_eq!(draft.status, ToolStatus::Approved);
        assert_eq!(draft.slug, "eleven-labs");
        assert_eq!(draft.pricing, Pricing::Freemium);
    }

    #[test]
    fn admin_can_create_a_pending_tool_explicitly() {
        let body: InputToolDto = serde_json::from_value(serde_json::json!({
            "name": "Runway ML",
            "slug": "runway",
            "description": "Video tools",
            "url": "https://runwayml.com",
            "category_id": Uuid::new_v4(),
            "status": "pending"
        }))
        .unwrap();
        let draft = body.into_draft(None);
        assert_eq!(draft.status, ToolStatus::Pending);
        assert_eq!(draft.slug, "runway");
    }

    #[test]
    fn submissions_are_always_pending_and_unflagged() {
        let submitter = Uuid::new_v4();
        let body: SubmitToolDto = serde_json::from_value(serde_json::json!({
            "name": "Jasper AI",
            "description": "Marketing copy",
            "url": "https://jasper.ai",
            "category_id": Uuid::new_v4(),
            "verified": true,
            "featured": true,
            "status": "approved"
        }))
        .unwrap();
        let draft = body.into_draft(submitter);
        assert_eq!(draft.status, ToolStatus::Pending);
        assert!(!draft.verified);
        assert!(!draft.featured);
        assert_eq!(draft.submitted_by, Some(submitter));
    }

    fn tool_body(name: &str, slug: Option<&str>) -> InputToolDto {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "slug": slug,
            "description": "Writes things",
            "url": "https://example.com",
            "category_id": Uuid::new_v4()
        }))
        .unwrap()
    }

    #[test]
    fn empty_slug_is_derived_from_the_name() {
        let body = tool_body("Copy AI", Some(""));
        assert!(body.validate().is_ok());
        assert_eq!(body.into_draft(None).slug, "copy-ai");
    }

    #[test]
    fn explicit_slug_must_match_character_class() {
        assert!(tool_body("Copy AI", Some("Copy AI")).validate().is_err());
    }

    #[test]
    fn name_that_yields_no_slug_is_rejected() {
        assert!(tool_body("日本語", None).validate().is_err());
        assert!(tool_body("日本語", Some("")).validate().is_err());
        assert!(tool_body("日本語", Some("nihongo")).validate().is_ok());

        let submission: SubmitToolDto = serde_json::from_value(serde_json::json!({
            "name": "日本語",
            "description": "Translation",
            "url": "https://example.com",
            "category_id": Uuid::new_v4()
        }))
        .unwrap();
        assert!(submission.validate().is_err());
    }

    #[test]
    fn blank_catalog_filters_are_accepted() {
        let params: CatalogQueryParams = serde_json::from_value(serde_json::json!({
            "category": "",
            "q": ""
        }))
        .unwrap();
        assert!(params.validate().is_ok());
    }

    #[test]
    fn news_tags_are_split_and_trimmed() {
        let item = NewsItem {
            id: Uuid::new_v4(),
            title: "Model release".into(),
            description: None,
            content: None,
            image_url: None,
            category: Some("LLMs, Research ,,".into()),
            source: Some("Wire".into()),
            date: Utc::now(),
            created_at: Utc::now(),
        };
        let dto = NewsItemDto::from(item.clone());
        assert_eq!(dto.categories, vec!["LLMs", "Research"]);

        let untagged = NewsItemDto::from(NewsItem {
            category: None,
            ..item
        });
        assert!(untagged.categories.is_empty());

        let json = serde_json::to_value(&untagged).unwrap();
        assert_eq!(json["title"], "Model release");
        assert_eq!(json["source"], "Wire");
    }

    #[test]
    fn unknown_status_is_rejected_by_serde() {
        let parsed: Result<ToolStatusUpdateDto, _> =
            serde_json::from_value(serde_json::json!({ "status": "archived" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn category_slug_must_match_character_class() {
        let ok = InputCategoryDto {
            name: "Voice & Audio".into(),
            slug: "voice-audio".into(),
            icon: None,
            description: None,
        };
        assert!(ok.validate().is_ok());
        assert_eq!(ok.icon_or_default(), "FolderOpen");

        let bad = InputCategoryDto {
            slug: "Voice Audio".into(),
            ..ok.clone()
        };
        assert!(bad.validate().is_err());

        let missing = InputCategoryDto {
            slug: String::new(),
            ..ok
        };
        assert!(missing.validate().is_err());
    }

    #[test]
    fn review_input_bounds() {
        let ok = InputReviewRequest {
            rating: 5,
            comment: Some("  great  ".into()),
        };
        assert!(ok.validate().is_ok());
        assert_eq!(ok.normalized_comment().as_deref(), Some("great"));

        let blank = InputReviewRequest {
            rating: 1,
            comment: Some("   ".into()),
        };
        assert_eq!(blank.normalized_comment(), None);

        for rating in [0, 6] {
            let bad = InputReviewRequest {
                rating,
                comment: None,
            };
            assert!(bad.validate().is_err());
        }

        let long = InputReviewRequest {
            rating: 3,
            comment: Some("x".repeat(501)),
        };
        assert!(long.validate().is_err());
    }
}
