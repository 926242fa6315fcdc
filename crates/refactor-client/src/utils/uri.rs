use lsp_types::Url;

/// Last path segment of a URI, decoded for `file:` URIs
pub fn file_name(uri: &Url) -> Option<String> {
    if let Ok(path) = uri.to_file_path() {
        return path.file_name().map(|name| name.to_string_lossy().into_owned());
    }
    uri.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

/// The directory containing the resource a URI names
pub fn parent_dir(uri: &Url) -> Option<Url> {
    uri.join(".").ok()
}

/// Whether every URI lives directly in the same directory; trivially true for zero or one URI
pub fn has_common_parent(uris: &[Url]) -> bool {
    let Some((first, rest)) = uris.split_first() else {
        return true;
    };
    let parent = parent_dir(first);
    rest.iter().all(|uri| parent_dir(uri) == parent)
}
