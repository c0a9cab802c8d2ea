use std::path::PathBuf;

use serde_json::{json, Value};

use crate::model::catalog::Catalog;
use crate::model::project::ProjectInfo;
use crate::parsers::ts;
use crate::services::{encoding, fsio, lookup, merge, pipeline, project, qa, render, stats};

mod command;
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn catalog_from_payload(payload: &Value, key: &str) -> Result<Catalog, String> {
    let value = payload
        .get(key)
        .cloned()
        .ok_or_else(|| format!("payload.{key} is required"))?;

    serde_json::from_value(value).map_err(|e| format!("invalid payload.{key}: {e}"))
}

fn str_field<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

fn required_str<'a>(payload: &'a Value, key: &str) -> Result<&'a str, String> {
    let value = str_field(payload, key);
    if value.is_empty() {
        return Err(format!("payload.{key} is required"));
    }
    Ok(value)
}

fn args_from_payload(payload: &Value) -> Vec<String> {
    payload
        .get("args")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Language pair for TM commands: explicit payload fields win, the
/// catalog's own metadata is the fallback.
fn language_pair<'a>(payload: &'a Value, catalog: &'a Catalog) -> (&'a str, &'a str) {
    let source = match str_field(payload, "source_lang") {
        "" => catalog.source_language.as_str(),
        s => s,
    };
    let target = match str_field(payload, "target_lang") {
        "" => catalog.language.as_str(),
        s => s,
    };
    (source, target)
}

pub fn handle(input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let cmd_str = get_cmd(&req);
    let payload = get_payload(&req);

    tracing::debug!(cmd = cmd_str, "handling request");

    match Command::from(cmd_str) {
        Command::Ping => ok(id, json!({ "message": "linguist-core alive" })),

        Command::ParseTs => {
            let text = str_field(payload, "text");
            match ts::parse(text) {
                Ok(catalog) => ok(id, json!({ "catalog": catalog })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::RenderTs => {
            let catalog = match catalog_from_payload(payload, "catalog") {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };
            ok(id, json!({ "text": render::render(&catalog) }))
        }

        Command::LoadCatalog => {
            let path = match required_str(payload, "path") {
                Ok(p) => PathBuf::from(p),
                Err(e) => return err(id, e),
            };
            let text = match encoding::read_to_string(&path) {
                Ok(t) => t,
                Err(e) => return err(id, e.to_string()),
            };
            match ts::parse(&text) {
                Ok(catalog) => ok(id, json!({ "catalog": catalog })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::SaveCatalog => {
            let path = match required_str(payload, "path") {
                Ok(p) => PathBuf::from(p),
                Err(e) => return err(id, e),
            };
            let catalog = match catalog_from_payload(payload, "catalog") {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };
            let text = render::render(&catalog);
            match fsio::write_atomic(&path, text.as_bytes()) {
                Ok(()) => ok(id, json!({ "path": path.to_string_lossy() })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::RunQa => {
            let catalog = match catalog_from_payload(payload, "catalog") {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };
            ok(id, json!({ "issues": qa::run(&catalog) }))
        }

        Command::Stats => {
            let catalog = match catalog_from_payload(payload, "catalog") {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };
            ok(id, json!({ "stats": stats::collect(&catalog) }))
        }

        Command::MergeTemplate => {
            let catalog = match catalog_from_payload(payload, "catalog") {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };
            let template = match catalog_from_payload(payload, "template") {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };
            let drop_vanished = payload
                .get("drop_vanished")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);

            let (merged, report) = merge::merge(&catalog, &template, drop_vanished);
            ok(id, json!({ "catalog": merged, "report": report }))
        }

        Command::FillFromTm => {
            let mut catalog = match catalog_from_payload(payload, "catalog") {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };
            let tm_entries = crate::services::translation_memory::store::load();
            let (source_lang, target_lang) = language_pair(payload, &catalog);
            let (source_lang, target_lang) = (source_lang.to_string(), target_lang.to_string());

            let filled = pipeline::fill_from_tm(&mut catalog, &tm_entries, &source_lang, &target_lang);
            ok(id, json!({ "catalog": catalog, "filled": filled }))
        }

        Command::UpdateWithTm => {
            let catalog = match catalog_from_payload(payload, "catalog") {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };
            let template = match catalog_from_payload(payload, "template") {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };
            let drop_vanished = payload
                .get("drop_vanished")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            let (source_lang, target_lang) = language_pair(payload, &catalog);

            let cfg = pipeline::UpdateConfig {
                source_lang,
                target_lang,
                drop_vanished,
            };
            match pipeline::update(&catalog, &template, cfg) {
                Ok((updated, report)) => ok(id, json!({ "catalog": updated, "report": report })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::Translate => {
            let catalog = match catalog_from_payload(payload, "catalog") {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };
            let context = str_field(payload, "context");
            let source = match required_str(payload, "source") {
                Ok(s) => s,
                Err(e) => return err(id, e),
            };
            let comment = payload.get("comment").and_then(|v| v.as_str());
            let args = args_from_payload(payload);

            let text = lookup::translate(&catalog, context, source, comment, &args);
            ok(id, json!({ "text": text }))
        }

        Command::DetectEncoding => {
            let path = match required_str(payload, "path") {
                Ok(p) => PathBuf::from(p),
                Err(e) => return err(id, e),
            };
            match encoding::detect_from_file(&path) {
                Ok(result) => ok(id, serde_json::to_value(result).unwrap_or(json!({}))),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::ProjectList => ok(id, json!({ "projects": project::list_projects() })),

        Command::ProjectCreate => {
            let name = match required_str(payload, "name") {
                Ok(s) => s.to_string(),
                Err(e) => return err(id, e),
            };
            let root_path = match required_str(payload, "root_path") {
                Ok(s) => s.to_string(),
                Err(e) => return err(id, e),
            };
            let source_language = str_field(payload, "source_language").to_string();
            let target_language = str_field(payload, "target_language").to_string();
            let catalog_file = str_field(payload, "catalog_file").to_string();

            match project::create_project(name, root_path, source_language, target_language, catalog_file)
            {
                Ok(p) => ok(id, json!({ "project_path": p.project_path })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::ProjectOpen => {
            let project_path = match required_str(payload, "project_path") {
                Ok(s) => s.to_string(),
                Err(e) => return err(id, e),
            };
            match project::open_project(project_path) {
                Ok(p) => ok(id, json!({ "project": p })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::ProjectSave => {
            let project_val = payload.get("project").cloned().unwrap_or(Value::Null);
            if project_val.is_null() {
                return err(id, "payload.project is required");
            }

            let p: ProjectInfo = match serde_json::from_value(project_val) {
                Ok(v) => v,
                Err(e) => return err(id, format!("invalid payload.project: {e}")),
            };

            match project::save_project(p) {
                Ok(saved) => ok(id, json!({ "project": saved })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::Unknown => err(id, "unknown command"),
    }
}
