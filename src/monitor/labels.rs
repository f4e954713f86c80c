use crate::config::LabelsConfig;

/// Placeholder for a label the container does not declare.
pub const MISSING_LABEL: &str = "-";

/// Labels attached to every document of a container, read once from its
/// declared environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerLabels {
    pub host: String,
    pub app_id: String,
}

/// Extract `host` and `appID` from `KEY=VALUE` environment entries.
///
/// The app id is trimmed of surrounding `/` and spaces (Marathon ids look
/// like `/group/app`); the host is taken verbatim. The first entry for each
/// key wins.
pub fn extract_labels(env: &[String], keys: &LabelsConfig) -> ContainerLabels {
    let app_id = lookup(env, &keys.app_id_key)
        .map(|v| v.trim_matches(|c| c == '/' || c == ' ').to_string());
    let host = lookup(env, &keys.host_key).map(str::to_string);

    ContainerLabels {
        host: host.unwrap_or_else(|| MISSING_LABEL.to_string()),
        app_id: app_id.unwrap_or_else(|| MISSING_LABEL.to_string()),
    }
}

fn lookup<'a>(env: &'a [String], key: &str) -> Option<&'a str> {
    env.iter().find_map(|entry| {
        entry
            .strip_prefix(key)
            .and_then(|rest| rest.strip_prefix('='))
    })
}
