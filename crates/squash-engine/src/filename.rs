//! Derived asset names

use squash_config::FilenameTemplate;
use squash_types::PathData;

/// Placeholders that tie a derived name to its original's name
const NAME_PLACEHOLDERS: [&str; 3] = ["[name]", "[base]", "[file]"];

fn placeholder<'a>(key: &str, data: &'a PathData) -> Option<&'a str> {
    Some(match key {
        "file" => &data.file,
        "query" => &data.query,
        "fragment" => &data.fragment,
        "path" => &data.path,
        "base" => &data.base,
        "name" => &data.name,
        "ext" => &data.ext,
        _ => return None,
    })
}

/// Substitute `[placeholder]`s in `template`; unknown ones are kept verbatim
pub fn interpolate(template: &str, data: &PathData) -> String {
    let mut out = String::with_capacity(template.len() + data.filename.len());
    let mut rest = template;

    while let Some(start) = rest.find('[') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let replaced = tail
            .find(']')
            .and_then(|end| placeholder(&tail[1..end], data).map(|value| (end, value)));
        match replaced {
            Some((end, value)) => {
                out.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('[');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Derived name of the asset called `name`.
///
/// Dynamic templates are called with the path data and their result is
/// interpolated like a static template.
pub fn render(template: &FilenameTemplate, name: &str) -> String {
    let data = PathData::from_filename(name);
    match template {
        FilenameTemplate::Static(template) => interpolate(template, &data),
        FilenameTemplate::Dynamic { func, .. } => interpolate(&func(&data), &data),
    }
}

/// Whether derived names keep the original's content addressing.
///
/// Only static templates referencing the original name qualify; what a
/// function returns cannot be known ahead of time.
pub fn is_immutable_template(template: &FilenameTemplate) -> bool {
    template
        .as_static()
        .is_some_and(|template| NAME_PLACEHOLDERS.iter().any(|p| template.contains(p)))
}
