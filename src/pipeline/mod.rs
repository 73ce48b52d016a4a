//! Pipeline stages for document analysis.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different extraction backend) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ prompts ──▶ llm ──▶ format / report
//! (file)    (lopdf)    (template)  (proxy)  (screen)  (print)
//! ```
//!
//! 1. [`input`]   — validate the user-supplied document (magic bytes, size)
//! 2. [`extract`] — per-page text extraction, pages joined by a blank line
//! 3. [`llm`]     — drive the model fallback chain through the proxy; the
//!    only stage with network I/O
//! 4. [`format`]  — classify the answer into display sections (on-screen)
//! 5. [`report`]  — lay out and paginate the printable PDF report
//!
//! [`format`] and [`report`] apply deliberately different line heuristics;
//! they are independent transforms over the same analysis text.

pub mod extract;
pub mod format;
pub mod input;
pub mod llm;
pub mod report;
