//! System instruction for the extraction model.
//!
//! The instruction is a fixed template; only "today" varies, so the same day
//! always produces the same bytes.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use gofin_core::time::today_string;

const TODAY_PLACEHOLDER: &str = "{TODAY}";

const SYSTEM_TEMPLATE: &str = r#"You are a personal finance assistant.

Your only task is to convert the user's text into a single VALID JSON object (no comments, no extra text, no markdown, no ```).

Today's date is {TODAY}.

The JSON MUST have exactly this shape:

{
  "transactions": [
    {
      "description": "string - short friendly description, e.g. Lunch at the mall",
      "amount": 100.5,
      "type": "despesa" or "receita",
      "category": "lazer" | "alimentacao" | "transporte" | "salario" | "contas" | "mercado" | "other",
      "date": "YYYY-MM-DD"
    }
  ]
}

Rules:
- Emit one entry per financial event mentioned in the text.
- "amount" is always a positive number (no minus sign).
- If the user EARNED or RECEIVED money -> "type": "receita".
- If the user SPENT or PAID money -> "type": "despesa".
- If the category is unclear, use "other".
- If the user names a specific day ("yesterday", "on the 10th", "2024-01-10"), resolve it against today's date and put it in "date".
- If the user does not mention a date, use today's date: {TODAY}.
- If the text contains no financial event, return {"transactions": []}.
- Answer ONLY with valid JSON."#;

/// Instruction plus user text, ready for the model client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    /// The `YYYY-MM-DD` embedded in `system`
    pub today: String,
}

/// Build the system instruction for a given `YYYY-MM-DD` day.
pub fn system_instruction(today: &str) -> String {
    SYSTEM_TEMPLATE.replace(TODAY_PLACEHOLDER, today)
}

/// Build the full prompt for `text`, resolving "today" in `tz`.
pub fn build_prompt(text: &str, now: DateTime<Utc>, tz: Tz) -> Prompt {
    let today = today_string(now, tz);
    Prompt {
        system: system_instruction(&today),
        user: text.to_string(),
        today,
    }
}
