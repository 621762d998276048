pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

/// Keeps the last four characters of a phone number visible for logs.
pub fn mask_phone_no(phone_no: &str) -> String {
    let visible = phone_no.chars().count().saturating_sub(4);
    phone_no
        .chars()
        .enumerate()
        .map(|(idx, c)| if idx < visible { '*' } else { c })
        .collect()
}
