use anyhow::anyhow;

pub(crate) fn optional_trimmed_from_env(name: &str) -> anyhow::Result<Option<String>> {
    let value = match std::env::var_os(name) {
        Some(value) => value,
        None => return Ok(None),
    };

    let value = value.to_string_lossy();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{name} is set but empty"));
    }

    Ok(Some(trimmed.to_owned()))
}
