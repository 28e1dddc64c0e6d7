use super::{ContentType, CourseLevel, Difficulty, ToolContext};

pub const CONTENT_SYSTEM: &str = "You are an expert AI tool reviewer and technical writer. Your content is accurate, engaging, and SEO-optimized.";

pub const NEWS_SYSTEM: &str =
    "You are a professional tech journalist specializing in AI tools and technology news.";

pub const TUTORIAL_SYSTEM: &str =
    "You are an expert technical instructor creating clear, actionable tutorials for AI tools.";

pub const COURSE_SYSTEM: &str = "You are an expert curriculum designer specializing in AI tool education and professional training programs.";

/// Sampling settings for one kind of request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub max_tokens: u32,
    pub json_object: bool,
}

pub const CONTENT_SAMPLING: Sampling = Sampling {
    temperature: 0.7,
    max_tokens: 1000,
    json_object: false,
};

pub const NEWS_SAMPLING: Sampling = Sampling {
    temperature: 0.7,
    max_tokens: 1500,
    json_object: true,
};

pub const TUTORIAL_SAMPLING: Sampling = Sampling {
    temperature: 0.6,
    max_tokens: 2000,
    json_object: true,
};

pub const COURSE_SAMPLING: Sampling = Sampling {
    temperature: 0.6,
    max_tokens: 3000,
    json_object: true,
};

pub fn content_prompt(tool: &ToolContext, content_type: ContentType) -> String {
    let category = tool.category_name();
    match content_type {
        ContentType::Description => format!(
            "Write a compelling 2-3 paragraph description for {name}, an AI tool in the {category} category.\n\n\
             Current description: {description}\n\
             Website: {url}\n\n\
             Make it engaging, informative, and SEO-friendly. Focus on what makes this tool unique and valuable to users.",
            name = tool.name,
            description = tool.description,
            url = tool.url,
        ),
        ContentType::Features => format!(
            "List the top 10 key features of {name}, an AI tool for {category}.\n\n\
             Format as a JSON array of feature objects with \"title\" and \"description\" fields.\n\
             Example: [{{\"title\": \"Feature Name\", \"description\": \"Brief description\"}}]\n\n\
             Make features specific, actionable, and valuable to potential users.",
            name = tool.name,
        ),
        ContentType::Benefits => format!(
            "List the top 8 benefits of using {name} for {category} tasks.\n\n\
             Format as a JSON array of benefit objects with \"title\" and \"description\" fields.\n\
             Example: [{{\"title\": \"Benefit Title\", \"description\": \"How it helps users\"}}]\n\n\
             Focus on real-world value and outcomes users can achieve.",
            name = tool.name,
        ),
    }
}

/// One-line background on the tool for a news article; empty when the
/// article is not about a known tool.
pub fn news_tool_context(tool: Option<&ToolContext>) -> String {
    match tool {
        Some(tool) => format!(
            "This news is about {}, an AI tool in the {} category. {}",
            tool.name,
            tool.category_name(),
            tool.description
        ),
        None => String::new(),
    }
}

pub fn news_prompt(topic: &str, tool_context: &str) -> String {
    format!(
        r#"Write a professional news article about: {topic}

{tool_context}

Generate a JSON response with:
{{
  "title": "Catchy headline (60-80 characters)",
  "excerpt": "Brief 1-2 sentence summary",
  "content": "Full article (300-500 words, use HTML paragraphs <p>)",
  "tags": ["relevant", "keywords", "array"]
}}

Make it newsworthy, accurate, and engaging. Use a professional journalistic tone."#
    )
}

pub fn tutorial_prompt(tool: &ToolContext, difficulty: Difficulty) -> String {
    let difficulty = difficulty.as_str();
    format!(
        r#"Create a comprehensive step-by-step tutorial for {name}, an AI tool for {category}.

Tool Info:
- Name: {name}
- Description: {description}
- Website: {url}

Difficulty Level: {difficulty}

Generate a JSON response with:
{{
  "title": "Tutorial title",
  "description": "What users will learn (2-3 sentences)",
  "duration": "Estimated time (e.g., '30 minutes')",
  "difficulty": "{difficulty}",
  "steps": [
    {{
      "step": 1,
      "title": "Step title",
      "content": "Detailed instructions (use HTML for formatting)",
      "tips": ["Helpful tip 1", "Helpful tip 2"]
    }}
  ],
  "resources": ["Additional resource links or tools"]
}}

Make it practical, actionable, and easy to follow. Include 5-8 steps."#,
        name = tool.name,
        category = tool.category_name(),
        description = tool.description,
        url = tool.url,
    )
}

pub fn course_prompt(tool: &ToolContext, level: CourseLevel) -> String {
    let level = level.as_str();
    format!(
        r#"Design a comprehensive online course for mastering {name}, an AI tool in the {category} category.

Tool Info:
- Name: {name}
- Description: {description}
- Website: {url}

Course Level: {level}

Generate a JSON response with:
{{
  "title": "Course title",
  "description": "Course overview (3-4 sentences)",
  "duration": "Total duration (e.g., '8 hours')",
  "level": "{level}",
  "objectives": ["Learning objective 1", "Learning objective 2", ...],
  "modules": [
    {{
      "module": 1,
      "title": "Module title",
      "description": "What this module covers",
      "lessons": [
        {{
          "title": "Lesson title",
          "duration": "Duration",
          "topics": ["Topic 1", "Topic 2"]
        }}
      ]
    }}
  ],
  "prerequisites": ["Required knowledge or skills"],
  "certification": true
}}

Create 4-6 modules with 3-5 lessons each. Make it comprehensive and structured for effective learning."#,
        name = tool.name,
        category = tool.category_name(),
        description = tool.description,
        url = tool.url,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(category: Option<&str>) -> ToolContext {
        ToolContext {
            name: "Midjourney".to_string(),
            description: "Image generation from text".to_string(),
            url: "https://midjourney.com".to_string(),
            category_name: category.map(str::to_string),
        }
    }

    #[test]
    fn description_prompt_carries_tool_fields() {
        let prompt = content_prompt(&tool(Some("Image Generation")), ContentType::Description);
        assert!(prompt.starts_with(
            "Write a compelling 2-3 paragraph description for Midjourney, an AI tool in the Image Generation category."
        ));
        assert!(prompt.contains("Current description: Image generation from text"));
        assert!(prompt.contains("Website: https://midjourney.com"));
    }

    #[test]
    fn missing_category_reads_ai_tools() {
        let prompt = content_prompt(&tool(None), ContentType::Benefits);
        assert!(prompt.starts_with("List the top 8 benefits of using Midjourney for AI tools tasks."));
    }

    #[test]
    fn features_prompt_shows_a_json_example() {
        let prompt = content_prompt(&tool(Some("Art")), ContentType::Features);
        assert!(prompt.contains(r#"[{"title": "Feature Name", "description": "Brief description"}]"#));
    }

    #[test]
    fn news_context_is_empty_without_tool() {
        assert_eq!(news_tool_context(None), "");
        let prompt = news_prompt("GPT-5 launch", "");
        assert!(prompt.starts_with("Write a professional news article about: GPT-5 launch\n\n\n"));
    }

    #[test]
    fn news_context_names_the_tool() {
        assert_eq!(
            news_tool_context(Some(&tool(Some("Art")))),
            "This news is about Midjourney, an AI tool in the Art category. Image generation from text"
        );
    }

    #[test]
    fn tutorial_and_course_embed_level() {
        let tutorial = tutorial_prompt(&tool(Some("Art")), Difficulty::Advanced);
        assert!(tutorial.contains("Difficulty Level: advanced"));
        assert!(tutorial.contains(r#""difficulty": "advanced""#));
        assert!(tutorial.contains("Include 5-8 steps."));

        let course = course_prompt(&tool(Some("Art")), CourseLevel::Expert);
        assert!(course.contains("Course Level: expert"));
        assert!(course.contains(r#""level": "expert""#));
        assert!(course.contains("Create 4-6 modules with 3-5 lessons each."));
    }
}
