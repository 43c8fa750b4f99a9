//! Input neutralization applied to every text-bearing form field before it is
//! matched against a choice set or persisted.

/// Elements removed together with everything between their open and close tags.
const STRIPPED_ELEMENTS: &[&str] = &["script", "iframe"];

/// Trims the value and removes `<script>…</script>` and `<iframe>…</iframe>`
/// blocks (case-insensitive, spanning newlines).
///
/// An opening tag without a matching close tag is left untouched.
pub fn sanitize_input(raw: &str) -> String {
    let mut out = raw.trim().to_string();
    for element in STRIPPED_ELEMENTS {
        out = strip_element(&out, element);
    }
    out
}

fn strip_element(input: &str, element: &str) -> String {
    let open = format!("<{element}");
    let close = format!("</{element}>");
    // ASCII lowercasing keeps byte offsets aligned with `input`.
    let lower = input.to_ascii_lowercase();

    let mut out = String::with_capacity(input.len());
    let mut cursor = 0;

    while let Some(rel) = lower[cursor..].find(&open) {
        let start = cursor + rel;
        let Some(tag_end) = lower[start..].find('>').map(|i| start + i + 1) else {
            break;
        };
        let Some(end) = lower[tag_end..].find(&close).map(|i| tag_end + i + close.len()) else {
            break;
        };
        out.push_str(&input[cursor..start]);
        cursor = end;
    }

    out.push_str(&input[cursor..]);
    out
}
