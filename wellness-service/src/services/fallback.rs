//! Pre-written text returned when a generation call fails.
//!
//! Blog fallbacks are chosen by an ordered keyword table, first match wins,
//! so the result is a pure function of the title.

/// Chat reply used whenever the provider call fails.
pub const CHAT_FALLBACK: &str = "I'm here to listen and support you. While I'm having technical difficulties right now, please know that your feelings are valid and you're not alone. Would you like to try again, or would you prefer to explore some self-care resources?";

/// Chat reply used when the provider succeeds but returns no text.
pub const CHAT_EMPTY_REPLY: &str =
    "I'm here to support you. Could you tell me more about how you're feeling?";

/// Title assumed when the blog request body could not be read at all.
pub const DEFAULT_BLOG_TITLE: &str = "Mental Health Journey";

const ANXIETY: &str = "Dealing with anxiety has been one of the most challenging aspects of my college experience, but I've learned so much about myself through this journey.

The racing thoughts, the physical symptoms, the constant worry - if you're reading this and nodding along, you're not alone. What I've discovered is that small, consistent steps make a huge difference.

One thing that really helped me was creating a \"worry time\" - setting aside 15 minutes each day to acknowledge my anxious thoughts, then consciously choosing to focus on the present moment for the rest of the day.

I've also learned that it's okay to have bad days. Progress isn't linear, and healing isn't a destination - it's an ongoing journey of self-compassion and growth.";

const DEPRESSION: &str = "The heaviness that comes with depression is something that's hard to explain to someone who hasn't experienced it. Some days, even the simplest tasks feel overwhelming.

But I want to share what I've learned: small victories count. Getting out of bed, taking a shower, eating a meal - these aren't insignificant. They're acts of self-care and resistance against the darkness.

I've found that connecting with others, even when I don't feel like it, makes a difference. This community has shown me that vulnerability is actually a form of strength.

If you're in a similar place, please know that your feelings are valid, and there are people who care about your wellbeing - including me.";

const STRESS: &str = "College stress is real, and it affects all of us differently. Between academic pressure, financial concerns, and social expectations, it's no wonder so many of us feel overwhelmed.

What I've learned through therapy and personal experience is that stress management isn't about eliminating stress entirely - it's about developing healthy coping mechanisms.

Time blocking has been a game-changer for me. Instead of feeling like everything is urgent, I allocate specific times for studying, socializing, and self-care. It's not perfect, but it helps me feel more in control.

Remember: it's okay to ask for help, to take breaks, and to prioritize your mental health alongside your academic goals.";

const GENERIC: &str = "This journey hasn't been easy, but I want to share what I've learned along the way. Sometimes the smallest steps forward can make the biggest difference in our mental health journey.

I've discovered that being open about our struggles not only helps us heal but also creates space for others to share their own experiences. Every story matters, and every voice in this community contributes to our collective healing.

Through the challenges I've faced, I've learned the importance of:
- Taking things one day at a time
- Celebrating small victories
- Reaching out for support when needed
- Practicing self-compassion

I hope my experience can offer some comfort or insight to anyone going through similar challenges. Remember, you're not alone in this journey.";

/// Theme of a blog fallback paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackTheme {
    Anxiety,
    Depression,
    Stress,
    Generic,
}

impl FallbackTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackTheme::Anxiety => "anxiety",
            FallbackTheme::Depression => "depression",
            FallbackTheme::Stress => "stress",
            FallbackTheme::Generic => "generic",
        }
    }

    pub fn content(&self) -> &'static str {
        match self {
            FallbackTheme::Anxiety => ANXIETY,
            FallbackTheme::Depression => DEPRESSION,
            FallbackTheme::Stress => STRESS,
            FallbackTheme::Generic => GENERIC,
        }
    }
}

/// One row of the keyword table.
pub struct FallbackRule {
    /// Lowercase substrings; any one of them matches.
    pub keywords: &'static [&'static str],
    pub theme: FallbackTheme,
}

/// Evaluated top to bottom; the first rule with a matching keyword wins.
pub const BLOG_FALLBACK_RULES: &[FallbackRule] = &[
    FallbackRule {
        keywords: &["anxiety"],
        theme: FallbackTheme::Anxiety,
    },
    FallbackRule {
        keywords: &["depression", "sad"],
        theme: FallbackTheme::Depression,
    },
    FallbackRule {
        keywords: &["stress"],
        theme: FallbackTheme::Stress,
    },
];

/// Pick the fallback theme for a blog title.
pub fn blog_fallback_theme(title: &str) -> FallbackTheme {
    let title = title.to_lowercase();
    BLOG_FALLBACK_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| title.contains(kw)))
        .map(|rule| rule.theme)
        .unwrap_or(FallbackTheme::Generic)
}

/// Fallback paragraph for a blog title.
pub fn blog_fallback_content(title: &str) -> &'static str {
    blog_fallback_theme(title).content()
}
