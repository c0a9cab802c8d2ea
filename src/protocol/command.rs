#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    ParseTs,
    RenderTs,
    LoadCatalog,
    SaveCatalog,
    RunQa,
    Stats,
    MergeTemplate,
    FillFromTm,
    UpdateWithTm,
    Translate,
    DetectEncoding,
    ProjectList,
    ProjectCreate,
    ProjectOpen,
    ProjectSave,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "parse_ts" => Command::ParseTs,
            "render_ts" => Command::RenderTs,
            "load_catalog" | "catalog.load" => Command::LoadCatalog,
            "save_catalog" | "catalog.save" => Command::SaveCatalog,
            "run_qa" => Command::RunQa,
            "stats" => Command::Stats,
            "merge_template" => Command::MergeTemplate,
            "fill_from_tm" => Command::FillFromTm,
            "update_with_tm" => Command::UpdateWithTm,
            "translate" => Command::Translate,
            "detect_encoding" | "encoding.detect" => Command::DetectEncoding,
            "project.list" => Command::ProjectList,
            "project.create" => Command::ProjectCreate,
            "project.open" => Command::ProjectOpen,
            "project.save" => Command::ProjectSave,
            _ => Command::Unknown,
        }
    }
}
