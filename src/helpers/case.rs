//! Word-boundary case conversion for route segments

/// Convert a string to lower-case, hyphen-separated words.
///
/// Accented Latin letters are first reduced to ASCII (see [`deburr`]). Words
/// break on any non-alphanumeric character, on lower-to-upper case
/// transitions, before the last capital of an upper-case run that starts a
/// capitalised word (`XMLHttp` -> `xml-http`) and between letters and digits,
/// except that ordinals (`1st`, `22nd`, `4th`) stay one word. Apostrophes are
/// dropped rather than treated as breaks.
///
/// # Examples
/// ```
/// use contentpress::helpers::kebab_case;
/// assert_eq!(kebab_case("Go Lang"), "go-lang");
/// assert_eq!(kebab_case("fooBar"), "foo-bar");
/// assert_eq!(kebab_case("__FOO_BAR__"), "foo-bar");
/// assert_eq!(kebab_case("Café Crème"), "cafe-creme");
/// ```
pub fn kebab_case(s: &str) -> String {
    words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Split a string into words using the boundaries described on [`kebab_case`]
pub fn words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut run: Vec<char> = Vec::new();

    for c in deburr(s).chars().filter(|c| !matches!(c, '\'' | '\u{2019}')) {
        if c.is_alphanumeric() {
            run.push(c);
        } else if !run.is_empty() {
            split_run(&run, &mut words);
            run.clear();
        }
    }
    if !run.is_empty() {
        split_run(&run, &mut words);
    }

    words
}

/// Replace accented Latin letters with plain ASCII and drop combining marks.
/// Other scripts are left untouched.
pub fn deburr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\u{300}'..='\u{36f}' | '\u{fe20}'..='\u{fe2f}' | '\u{20d0}'..='\u{20ff}' => {}
            '\u{c0}'..='\u{17f}' if c != '×' && c != '÷' => match deunicode::deunicode_char(c) {
                // `Æ` -> `Ae` so the letter still reads as one capitalised word
                Some(plain) if c.is_uppercase() => {
                    let mut chars = plain.chars();
                    if let Some(first) = chars.next() {
                        out.push(first.to_ascii_uppercase());
                        out.extend(chars.map(|c| c.to_ascii_lowercase()));
                    }
                }
                Some(plain) => out.push_str(plain),
                None => out.push(c),
            },
            _ => out.push(c),
        }
    }
    out
}

/// Split one alphanumeric run on case and digit boundaries
fn split_run(run: &[char], words: &mut Vec<String>) {
    let mut start = 0;
    let mut i = 1;
    while i < run.len() {
        let prev = run[i - 1];
        let cur = run[i];
        let next = run.get(i + 1).copied();

        if prev.is_ascii_digit() && is_ordinal_suffix(run, i) {
            let end = i + 2;
            if end < run.len() {
                words.push(run[start..end].iter().collect());
                start = end;
            }
            i = end + 1;
            continue;
        }

        let boundary = (prev.is_lowercase() && cur.is_uppercase())
            || (prev.is_uppercase()
                && cur.is_uppercase()
                && next.is_some_and(|n| n.is_lowercase()))
            || (prev.is_numeric() != cur.is_numeric());

        if boundary {
            words.push(run[start..i].iter().collect());
            start = i;
        }
        i += 1;
    }
    words.push(run[start..].iter().collect());
}

/// Whether `run[i..i + 2]` is an ordinal suffix for the digit before it:
/// `st` after 1, `nd` after 2, `rd` after 3, `th` after any other digit.
/// The suffix must be all lower or all upper case and end the word.
fn is_ordinal_suffix(run: &[char], i: usize) -> bool {
    let (Some(&a), Some(&b)) = (run.get(i), run.get(i + 1)) else {
        return false;
    };
    let lower = a.is_ascii_lowercase() && b.is_ascii_lowercase();
    let upper = a.is_ascii_uppercase() && b.is_ascii_uppercase();
    if !lower && !upper {
        return false;
    }

    let digit = run[i - 1];
    let matches_digit = match (a.to_ascii_lowercase(), b.to_ascii_lowercase()) {
        ('s', 't') => digit == '1',
        ('n', 'd') => digit == '2',
        ('r', 'd') => digit == '3',
        ('t', 'h') => !matches!(digit, '1' | '2' | '3'),
        _ => false,
    };
    let ends_word = match run.get(i + 2) {
        None => true,
        Some(c) if lower => c.is_uppercase(),
        Some(c) => c.is_lowercase(),
    };
    matches_digit && ends_word
}
