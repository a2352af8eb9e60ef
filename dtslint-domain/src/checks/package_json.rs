use super::PackageLocation;
use dtslint_types::TsVersion;
use serde_json::{Map, Value};

/// Checks `package.json` against repository conventions.
///
/// `cutoffs` are the `tsX.Y` directories found next to it, ascending.
pub fn check_package_json(
    json: &Value,
    location: &PackageLocation,
    cutoffs: &[TsVersion],
) -> Vec<String> {
    let Some(obj) = json.as_object() else {
        return vec!["package.json must contain a JSON object".to_string()];
    };

    let mut problems = Vec::new();

    if obj.get("private") != Some(&Value::Bool(true)) {
        problems.push("\"private\" must be true".to_string());
    }

    let expected_name = location.types_name();
    match obj.get("name").and_then(Value::as_str) {
        Some(name) if name == expected_name => {}
        Some(name) => problems.push(format!(
            "\"name\" is \"{name}\" but should be \"{expected_name}\""
        )),
        None => problems.push(format!(
            "\"name\" is missing; it should be \"{expected_name}\""
        )),
    }

    match obj.get("version").and_then(Value::as_str) {
        Some(version) => check_version(version, location, &mut problems),
        None => problems.push("\"version\" is missing".to_string()),
    }

    let dev_deps = obj.get("devDependencies").and_then(Value::as_object);
    let self_dep = dev_deps.and_then(|deps| deps.get(&expected_name));
    if self_dep.and_then(Value::as_str) != Some("workspace:.") {
        problems.push(format!(
            "\"devDependencies\" must contain \"{expected_name}\": \"workspace:.\""
        ));
    }

    check_types_versions(obj, cutoffs, &mut problems);

    problems
}

fn check_version(version: &str, location: &PackageLocation, problems: &mut Vec<String>) {
    let parts: Vec<&str> = version.split('.').collect();
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let [major, minor, patch] = parts[..] else {
        problems.push(format!(
            "\"version\" is \"{version}\" but should look like <major>.<minor>.9999"
        ));
        return;
    };
    if !numeric(major) || !numeric(minor) || patch != "9999" {
        problems.push(format!(
            "\"version\" is \"{version}\" but should look like <major>.<minor>.9999"
        ));
        return;
    }

    let Some(older) = location.older_version else {
        return;
    };
    let major_ok = major.parse::<u32>().ok() == Some(older.major);
    let minor_ok = older
        .minor
        .is_none_or(|m| minor.parse::<u32>().ok() == Some(m));
    if !major_ok || !minor_ok {
        problems.push(format!(
            "\"version\" is \"{version}\" but the directory is {older}; versions must match"
        ));
    }
}

fn check_types_versions(
    obj: &Map<String, Value>,
    cutoffs: &[TsVersion],
    problems: &mut Vec<String>,
) {
    let actual = obj.get("typesVersions");
    if cutoffs.is_empty() {
        if actual.is_some() {
            problems.push(
                "\"typesVersions\" is present but there are no tsX.Y directories".to_string(),
            );
        }
        return;
    }

    let expected = expected_types_versions(cutoffs);
    if actual != Some(&expected) {
        problems.push(format!(
            "\"typesVersions\" must match the tsX.Y directories exactly: {}",
            expected
        ));
    }
}

fn expected_types_versions(cutoffs: &[TsVersion]) -> Value {
    let mut map = Map::new();
    for c in cutoffs {
        map.insert(
            format!("<={c}"),
            serde_json::json!({ "*": [format!("{}/*", c.directory_name())] }),
        );
    }
    Value::Object(map)
}
