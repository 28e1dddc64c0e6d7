use serde::{Deserialize, Serialize};

/// What `generate-content` writes about a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Description,
    Features,
    Benefits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

impl CourseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "beginner",
            CourseLevel::Intermediate => "intermediate",
            CourseLevel::Advanced => "advanced",
            CourseLevel::Expert => "expert",
        }
    }
}

// Model output shapes. Text fields the prompt asks for are required; lists
// may be omitted by the model and default to empty.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorialStep {
    pub step: u32,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tutorial {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub steps: Vec<TutorialStep>,
    #[serde(default)]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub title: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseModule {
    pub module: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub modules: Vec<CourseModule>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub certification: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_accepts_model_output() {
        let raw = r#"{
            "title": "Mastering Midjourney",
            "description": "From prompts to production.",
            "duration": "8 hours",
            "level": "intermediate",
            "objectives": ["Write prompts"],
            "modules": [{
                "module": 1,
                "title": "Basics",
                "description": "Getting started",
                "lessons": [{ "title": "Setup", "duration": "20 minutes", "topics": ["Discord"] }]
            }],
            "prerequisites": [],
            "certification": true
        }"#;
        let course: Course = serde_json::from_str(raw).unwrap();
        assert_eq!(course.modules[0].lessons[0].topics, vec!["Discord"]);
        assert!(course.certification);
    }

    #[test]
    fn empty_object_is_not_a_news_article() {
        assert!(serde_json::from_str::<NewsArticle>("{}").is_err());
    }

    #[test]
    fn tutorial_lists_default_to_empty() {
        let tutorial: Tutorial =
            serde_json::from_str(r#"{ "title": "Intro", "description": "Learn" }"#).unwrap();
        assert!(tutorial.steps.is_empty());
        assert!(tutorial.resources.is_empty());
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        assert!(serde_json::from_str::<ContentType>(r#""summary""#).is_err());
        assert!(serde_json::from_str::<Difficulty>(r#""expert""#).is_err());
        assert_eq!(
            serde_json::from_str::<CourseLevel>(r#""expert""#).unwrap(),
            CourseLevel::Expert
        );
    }
}
