use embedfmt::config::EmbedConfig;
use embedfmt::doc::Doc;
use embedfmt::embed::Dispatcher;
use embedfmt::foreign::FormatterRegistry;
use embedfmt::formatter::{FormatOptions, format_source};
use embedfmt::options::Options;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Breaks before `FROM`, `WHERE` and `AND`, upper-casing those and `SELECT`.
fn fake_sql(text: &str, _: &Options) -> anyhow::Result<Doc> {
    const KEYWORDS: &[&str] = &["select", "from", "where", "and"];
    let mut lines: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        let lower = word.to_ascii_lowercase();
        let word = if KEYWORDS.contains(&lower.as_str()) {
            word.to_ascii_uppercase()
        } else {
            word.to_string()
        };
        match lines.last_mut() {
            Some(line) if !matches!(lower.as_str(), "from" | "where" | "and") => {
                line.push(' ');
                line.push_str(&word);
            }
            _ => lines.push(word),
        }
    }
    Ok(Doc::join(Doc::hardline(), lines.into_iter().map(Doc::text)))
}

/// One declaration or brace per line, nested blocks indented by two spaces.
fn fake_css(text: &str, _: &Options) -> anyhow::Result<Doc> {
    let mut lines = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in text.chars() {
        match c {
            ';' => {
                let declaration = match current.split_once(':') {
                    Some((property, value)) => format!("{}: {};", property.trim(), value.trim()),
                    None => format!("{};", current.trim()),
                };
                lines.push(format!("{}{declaration}", "  ".repeat(depth)));
                current.clear();
            }
            '{' => {
                lines.push(format!("{}{} {{", "  ".repeat(depth), current.trim()));
                depth += 1;
                current.clear();
            }
            '}' => {
                if !current.trim().is_empty() {
                    lines.push(format!("{}{}", "  ".repeat(depth), current.trim()));
                }
                depth = depth.saturating_sub(1);
                lines.push(format!("{}}}", "  ".repeat(depth)));
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        lines.push(current.trim().to_string());
    }
    Ok(Doc::lines(&lines.join("\n")))
}

fn fake_html(text: &str, _: &Options) -> anyhow::Result<Doc> {
    let lines: Vec<_> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    Ok(Doc::lines(&lines.join("\n")))
}

fn fake_json(text: &str, _: &Options) -> anyhow::Result<Doc> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    Ok(Doc::lines(&serde_json::to_string_pretty(&value)?))
}

fn formatters() -> FormatterRegistry {
    FormatterRegistry::new()
        .with("sql-formatter", fake_sql)
        .with("css", fake_css)
        .with("html", fake_html)
        .with("json", fake_json)
        .with("markdown", |text: &str, _: &Options| {
            Ok::<_, anyhow::Error>(Doc::text(text.replace('\'', "`")))
        })
}

fn dispatcher_with(config: serde_json::Value) -> Dispatcher {
    let config: EmbedConfig = serde_json::from_value(config).unwrap();
    Dispatcher::new(&config, formatters())
}

fn fmt_with(dispatcher: &Dispatcher, src: &str) -> String {
    format_source(src, &FormatOptions::default(), dispatcher).unwrap()
}

fn fmt(src: &str) -> String {
    fmt_with(&dispatcher_with(json!({})), src)
}

/// Find all test cases in the cases directory
fn find_test_cases() -> Vec<TestCase> {
    let cases_dir = Path::new("tests/cases");
    let mut test_cases = Vec::new();

    for entry in WalkDir::new(cases_dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        // Input files are named *_N.input
        if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
            if file_name.ends_with(".input") && file_name.contains('_') {
                if let Some(test_case) = create_test_case(path) {
                    test_cases.push(test_case);
                }
            }
        }
    }

    test_cases.sort_by(|a, b| a.name.cmp(&b.name));
    test_cases
}

#[derive(Debug, Clone)]
struct TestCase {
    name: String,
    input_file: PathBuf,
    expected_file: PathBuf,
}

/// Create a test case from an input file path
fn create_test_case(input_path: &Path) -> Option<TestCase> {
    let file_name = input_path.file_name()?.to_str()?;
    let parent_dir = input_path.parent()?;

    // e.g., "sql_2.input" -> "sql"
    let base_name = &file_name[..file_name.rfind('_')?];

    // The expected output shares the base name: base_name.js
    let expected_file = parent_dir.join(format!("{}.js", base_name));

    if expected_file.exists() {
        Some(TestCase {
            name: file_name.to_string(),
            input_file: input_path.to_path_buf(),
            expected_file,
        })
    } else {
        None
    }
}

/// Run a single test case
fn run_test_case(test_case: &TestCase) -> Result<(), String> {
    let input_content = fs::read_to_string(&test_case.input_file).map_err(|e| {
        format!(
            "Failed to read input file {:?}: {}",
            test_case.input_file, e
        )
    })?;
    let expected_content = fs::read_to_string(&test_case.expected_file).map_err(|e| {
        format!(
            "Failed to read expected file {:?}: {}",
            test_case.expected_file, e
        )
    })?;

    let formatted_content = fmt(&input_content);
    if formatted_content != expected_content {
        return Err(format!(
            "Formatting mismatch for test case '{}':\n\
             \n--- Expected ---\n{}\n\
             \n--- Got ---\n{}\n\
             \n--- Diff ---\n{}",
            test_case.name,
            expected_content,
            formatted_content,
            create_diff(&expected_content, &formatted_content)
        ));
    }

    let reformatted = fmt(&formatted_content);
    if reformatted != formatted_content {
        return Err(format!(
            "Formatting is not idempotent for test case '{}':\n{}",
            test_case.name,
            create_diff(&formatted_content, &reformatted)
        ));
    }
    Ok(())
}

/// Create a simple diff visualization
fn create_diff(expected: &str, actual: &str) -> String {
    let expected_lines: Vec<&str> = expected.lines().collect();
    let actual_lines: Vec<&str> = actual.lines().collect();

    let mut diff = String::new();
    let max_lines = expected_lines.len().max(actual_lines.len());

    for i in 0..max_lines {
        let expected_line = expected_lines.get(i).unwrap_or(&"");
        let actual_line = actual_lines.get(i).unwrap_or(&"");

        if expected_line != actual_line {
            diff.push_str(&format!(
                "Line {}: Expected: {:?}, Got: {:?}\n",
                i + 1,
                expected_line,
                actual_line
            ));
        }
    }

    if diff.is_empty() {
        "No line differences (possibly trailing whitespace)".to_string()
    } else {
        diff
    }
}

#[test]
fn case_files_formatting() {
    let test_cases = find_test_cases();

    assert!(!test_cases.is_empty(), "No test cases found in tests/cases/");

    let mut failures = Vec::new();
    for test_case in &test_cases {
        if let Err(error) = run_test_case(test_case) {
            failures.push(error);
        }
    }

    if !failures.is_empty() {
        panic!("Test failures:\n\n{}", failures.join("\n\n"));
    }
}

#[test]
fn sql_query_is_broken_into_indented_lines() {
    let input = "const q = sql`select id from users where id = ${userId}`;\n";
    let expected = "const q = sql`\n  SELECT id\n  FROM users\n  WHERE id = ${userId}\n`;\n";
    assert_eq!(fmt(input), expected);
}

#[test]
fn nested_claimed_literal_is_laid_out_where_it_ends_up() {
    let input = "const q = sql`select * from t where x in (${sql`select id from u where a = 1`})`;\n";
    let expected = "const q = sql`\n  SELECT *\n  FROM t\n  WHERE x in (${sql`\n    SELECT id\n    FROM u\n    WHERE a = 1\n  `})\n`;\n";
    assert_eq!(fmt(input), expected);
    assert_eq!(fmt(expected), expected);
}

#[test]
fn short_sql_stays_on_one_line() {
    let input = "run(sql`select 1`);\n";
    assert_eq!(fmt(input), "run(sql`SELECT 1`);\n");
}

#[test]
fn strict_html_keeps_exterior_whitespace() {
    let strict = dispatcher_with(json!({
        "overrides": [{ "identifiers": ["html"], "options": { "htmlWhitespaceSensitivity": "strict" } }]
    }));
    let input = "const t = html`  <p>\n     ${name}\n   </p>\n`;\n";
    assert_eq!(
        fmt_with(&strict, input),
        "const t = html`  <p>\n  ${name}\n  </p>\n`;\n"
    );

    // Without the strict setting the whitespace is normalised.
    assert_eq!(
        fmt(input),
        "const t = html`\n  <p>\n  ${name}\n  </p>\n`;\n"
    );
}

#[test]
fn preserve_whitespace_setting_applies_per_identifier() {
    let preserving = dispatcher_with(json!({ "preserveWhitespace": ["xhtml"] }));
    let input = "a = xhtml` <br/> `;\nb = html` <br/> `;\n";
    assert_eq!(fmt_with(&preserving, input), "a = xhtml` <br/> `;\nb = html` <br/> `;\n");

    let tight = "a = xhtml`<br/>  `;\nb = html`<br/>  `;\n";
    assert_eq!(fmt_with(&preserving, tight), "a = xhtml`<br/>  `;\nb = html`<br/> `;\n");
}

#[test]
fn unsupported_dialect_aborts_with_the_identifier() {
    let dispatcher = dispatcher_with(json!({
        "languages": { "sql": { "identifiers": ["legacy", "sql", "warehouse"] } }
    }));

    let err = format_source(
        "q = legacy`select 1`;\n",
        &FormatOptions::default(),
        &dispatcher,
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("`legacy`"), "{err:#}");

    // A later unknown identifier inherits the dialect of an earlier one.
    assert_eq!(
        fmt_with(&dispatcher, "q = warehouse`select 1`;\n"),
        "q = warehouse`SELECT 1`;\n"
    );
}

#[test]
fn backticks_produced_by_the_formatter_are_escaped() {
    let input = "const doc = md`use 'npm ci' here, not \\`npm i\\``;\n";
    assert_eq!(
        fmt(input),
        "const doc = md`use \\`npm ci\\` here, not \\`npm i\\``;\n"
    );
    assert_eq!(fmt(&fmt(input)), fmt(input));
}

#[test]
fn json_placeholders_survive_a_real_parser() {
    let input = "const body = json`{\"name\": \"${name}\", \"id\": ${id}}`;\n";
    let expected = "const body = json`\n  {\n    \"id\": ${id},\n    \"name\": \"${name}\"\n  }\n`;\n";
    assert_eq!(fmt(input), expected);
    assert_eq!(fmt(expected), expected);
}

#[test]
fn comment_and_tag_identification_follow_language_order() {
    // css comes before html in the language list, so the tag wins here ...
    assert_eq!(fmt("x = /* html */ css`a{b:c;}`;\n"), "x = /* html */ css`\n  a {\n    b: c;\n  }\n`;\n");
    // ... and the comment wins here.
    assert_eq!(fmt("x = /* css */ html`a{b:c;}`;\n"), "x = /* css */ html`\n  a {\n    b: c;\n  }\n`;\n");
}

#[test]
fn member_tags_are_matched_structurally() {
    let dispatcher = dispatcher_with(json!({
        "languages": { "css": { "identifiers": ["styled.div"] } }
    }));
    let input = "a = styled.div`color:red;`;\nb = styled.span`color:red;`;\n";
    assert_eq!(
        fmt_with(&dispatcher, input),
        "a = styled.div`color: red;`;\nb = styled.span`color:red;`;\n"
    );
}

#[test]
fn comment_identification_can_be_disabled() {
    let dispatcher = dispatcher_with(json!({
        "languages": { "css": { "noEmbeddedIdentificationByComment": ["css"] } }
    }));
    let input = "a = /* css */ `color:red;`;\nb = css`color:red;`;\n";
    assert_eq!(
        fmt_with(&dispatcher, input),
        "a = /* css */ `color:red;`;\nb = css`color: red;`;\n"
    );
}

#[test]
fn no_indent_keeps_content_at_column_zero() {
    let dispatcher = dispatcher_with(json!({ "noIndent": ["css"] }));
    let input = "function f() {\n  return css`\n    a { b: c; }\n  `;\n}\n";
    assert_eq!(
        fmt_with(&dispatcher, input),
        "function f() {\n  return css`\na {\n  b: c;\n}\n  `;\n}\n"
    );
}

#[test]
fn missing_formatter_leaves_other_files_alone() {
    let err = format_source("y = yaml`a: 1`;\n", &FormatOptions::default(), &dispatcher_with(json!({})))
        .unwrap_err();
    assert!(format!("{err:#}").contains("`yaml`"));
}
