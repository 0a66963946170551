//! Privacy masking for rendered reports.
//!
//! Passes run in a fixed order (user ids, phone numbers, chat ids) and each
//! one sees the output of the previous pass.

use std::sync::LazyLock;

use regex::Regex;

use crate::prefs::PrivacyOptions;

const PHONE_MASK: &str = "******";

static USER_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{8,10}\b").expect("valid regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+(\d{1,3})\d{6,}").expect("valid regex"));
static CHAT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-100\d{6,}").expect("valid regex"));

/// Apply the enabled masks to `text`.
///
/// User and chat ids stay readable between `****` markers; phone numbers keep
/// the `+` and country-code digits only.
pub fn apply_privacy_mask(text: &str, options: &PrivacyOptions) -> String {
    let mut out = text.to_string();

    if options.mask_user_ids {
        out = USER_ID_RE.replace_all(&out, "****${0}****").into_owned();
    }
    if options.mask_phone_numbers {
        out = PHONE_RE
            .replace_all(&out, format!("+${{1}}{PHONE_MASK}").as_str())
            .into_owned();
    }
    if options.mask_chat_ids {
        out = CHAT_ID_RE.replace_all(&out, "****${0}****").into_owned();
    }

    out
}
