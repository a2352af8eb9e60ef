use serde_json::Value;

const REQUIRED_TRUE: &[&str] = &["noEmit", "forceConsistentCasingInFileNames"];

// Implied by `"strict": true`.
const STRICT_FLAGS: &[&str] = &[
    "noImplicitAny",
    "noImplicitThis",
    "strictNullChecks",
    "strictFunctionTypes",
];

const FORBIDDEN: &[&str] = &["paths", "baseUrl", "typeRoots"];

/// Checks one `tsconfig.json` against repository conventions.
pub fn check_tsconfig(json: &Value) -> Vec<String> {
    let Some(options) = json.get("compilerOptions").and_then(Value::as_object) else {
        return vec!["\"compilerOptions\" must be an object".to_string()];
    };

    let mut problems = Vec::new();
    let is_true = |key: &str| options.get(key) == Some(&Value::Bool(true));

    for key in REQUIRED_TRUE {
        if !is_true(*key) {
            problems.push(format!("\"compilerOptions.{key}\" must be true"));
        }
    }

    if !is_true("strict") {
        for key in STRICT_FLAGS {
            if !is_true(*key) {
                problems.push(format!(
                    "\"compilerOptions.{key}\" must be true (or set \"strict\": true)"
                ));
            }
        }
    }

    match options.get("types").and_then(Value::as_array) {
        Some(types) if types.is_empty() => {}
        _ => problems.push("\"compilerOptions.types\" must be []".to_string()),
    }

    for key in FORBIDDEN {
        if options.contains_key(*key) {
            problems.push(format!("\"compilerOptions.{key}\" is not allowed"));
        }
    }

    let lists_index = json
        .get("files")
        .and_then(Value::as_array)
        .is_some_and(|files| files.iter().any(|f| f.as_str() == Some("index.d.ts")));
    if !lists_index {
        problems.push("\"files\" must include \"index.d.ts\"".to_string());
    }

    problems
}
