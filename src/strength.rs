// 🔐 Password Strength Engine
//
// Scores a password by character-class coverage plus length, and estimates
// how long an offline brute-force attack at 1e9 guesses/second would take.
// Pure functions only: nothing here touches account state.

use serde::Serialize;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Passwords shorter than this score zero
pub const MIN_LENGTH: usize = 8;

/// Scores below this value trigger the weak-password advisory
pub const WEAK_THRESHOLD: u32 = 3;

/// Scores at or above this value get no improvement suggestions
pub const STRONG_THRESHOLD: u32 = 8;

const GUESSES_PER_SECOND: f64 = 1_000_000_000.0;

const LOWERCASE_SIZE: u32 = 26;
const UPPERCASE_SIZE: u32 = 26;
const DIGIT_SIZE: u32 = 10;
const SPECIAL_SIZE: u32 = 33;

const MINUTE: f64 = 60.0;
const HOUR: f64 = 3_600.0;
const DAY: f64 = 86_400.0;
const YEAR: f64 = 31_536_000.0;
const DECADE: f64 = 315_360_000.0;
const MILLENNIUM: f64 = 31_536_000_000.0;

const PROGRESS_CELLS: u32 = 50;

// ============================================================================
// CHARACTER CLASSES
// ============================================================================

/// Which character classes occur in a password
///
/// Each character lands in exactly one class; anything that is not an ASCII
/// letter or digit counts as special.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharacterClasses {
    pub upper: bool,
    pub lower: bool,
    pub digit: bool,
    pub special: bool,
}

impl CharacterClasses {
    pub fn scan(password: &str) -> Self {
        let mut classes = CharacterClasses::default();
        for c in password.chars() {
            if c.is_ascii_uppercase() {
                classes.upper = true;
            } else if c.is_ascii_lowercase() {
                classes.lower = true;
            } else if c.is_ascii_digit() {
                classes.digit = true;
            } else {
                classes.special = true;
            }
        }
        classes
    }

    pub fn count(&self) -> u32 {
        [self.upper, self.lower, self.digit, self.special]
            .iter()
            .filter(|present| **present)
            .count() as u32
    }

    /// Size of the alphabet an attacker would have to search
    pub fn charset_size(&self) -> u32 {
        let mut size = 0;
        if self.lower {
            size += LOWERCASE_SIZE;
        }
        if self.upper {
            size += UPPERCASE_SIZE;
        }
        if self.digit {
            size += DIGIT_SIZE;
        }
        if self.special {
            size += SPECIAL_SIZE;
        }
        size
    }
}

// ============================================================================
// SCORING
// ============================================================================

/// Strength score: one point per character class present plus one point per
/// four characters. Anything shorter than [`MIN_LENGTH`] scores 0.
pub fn score(password: &str) -> u32 {
    let length = password.chars().count();
    if length < MIN_LENGTH {
        return 0;
    }

    CharacterClasses::scan(password).count() + (length / 4) as u32
}

/// Seconds needed to exhaust the password's search space
pub fn seconds_to_crack(password: &str) -> f64 {
    let charset = CharacterClasses::scan(password).charset_size() as f64;
    let length = password.chars().count() as i32;
    charset.powi(length) / GUESSES_PER_SECOND
}

/// Human-readable brute-force estimate, bucketed by unit
pub fn estimate_crack_time(password: &str) -> String {
    format_crack_time(seconds_to_crack(password))
}

fn format_crack_time(seconds: f64) -> String {
    if seconds < MINUTE {
        "Instant to seconds".to_string()
    } else if seconds < HOUR {
        format!("Minutes: {}", (seconds / MINUTE) as u64)
    } else if seconds < DAY {
        format!("Hours: {}", (seconds / HOUR) as u64)
    } else if seconds < YEAR {
        format!("Days: {}", (seconds / DAY) as u64)
    } else if seconds < DECADE {
        format!("Years: {}", (seconds / YEAR) as u64)
    } else if seconds < MILLENNIUM {
        format!("Centuries: {}", (seconds / DECADE) as u64)
    } else {
        "Millennia or more".to_string()
    }
}

/// True when the creation-time advisory should warn about this password
pub fn is_weak(password: &str) -> bool {
    score(password) < WEAK_THRESHOLD
}

// ============================================================================
// DIAGNOSTIC REPORT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StrengthRating {
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl StrengthRating {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=2 => StrengthRating::VeryWeak,
            3..=4 => StrengthRating::Weak,
            5..=6 => StrengthRating::Moderate,
            7..=8 => StrengthRating::Strong,
            _ => StrengthRating::VeryStrong,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrengthRating::VeryWeak => "Very Weak",
            StrengthRating::Weak => "Weak",
            StrengthRating::Moderate => "Moderate",
            StrengthRating::Strong => "Strong",
            StrengthRating::VeryStrong => "Very Strong",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StrengthRating::VeryWeak => "This could be cracked instantly.",
            StrengthRating::Weak => "This could be cracked within minutes to hours.",
            StrengthRating::Moderate => "This could take days to weeks to crack.",
            StrengthRating::Strong => "This could take months to years to crack.",
            StrengthRating::VeryStrong => "This would be extremely difficult to crack.",
        }
    }
}

/// Everything the password diagnostic shows for one candidate
#[derive(Debug, Clone, Serialize)]
pub struct StrengthReport {
    pub score: u32,
    pub crack_time: String,
    pub rating: StrengthRating,
    /// Share of the simulated attack that "finished" (0..=100)
    pub progress_percent: u32,
    /// Filled cells of a 50-cell progress bar
    pub progress_cells: u32,
    pub cracked: bool,
    pub suggestions: Vec<String>,
}

impl StrengthReport {
    /// Build a report. Blank input is refused; callers should ask again.
    pub fn analyze(password: &str) -> Option<Self> {
        if password.trim().is_empty() {
            return None;
        }

        let score = score(password);
        let cracked = score <= WEAK_THRESHOLD;
        let progress_cells = if cracked {
            PROGRESS_CELLS
        } else {
            (PROGRESS_CELLS * 5) / score
        };

        Some(StrengthReport {
            score,
            crack_time: estimate_crack_time(password),
            rating: StrengthRating::from_score(score),
            progress_percent: progress_cells * 100 / PROGRESS_CELLS,
            progress_cells,
            cracked,
            suggestions: suggestions(password, score),
        })
    }

    pub fn progress_bar(&self) -> String {
        let filled = self.progress_cells.min(PROGRESS_CELLS) as usize;
        format!(
            "[{}{}]",
            "=".repeat(filled),
            " ".repeat(PROGRESS_CELLS as usize - filled)
        )
    }
}

fn suggestions(password: &str, score: u32) -> Vec<String> {
    let mut tips = Vec::new();
    if score >= STRONG_THRESHOLD {
        return tips;
    }

    if password.chars().count() < 12 {
        tips.push("Increase length to at least 12 characters".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        tips.push("Add uppercase letters".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        tips.push("Add lowercase letters".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        tips.push("Add numbers".to_string());
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        tips.push("Add special characters (!@#$%^&*)".to_string());
    }
    tips
}

// ============================================================================
// TESTS
// ============================================================================
