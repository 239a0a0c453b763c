//! Slash-separated location arithmetic.
//!
//! Both backends address objects with `/`-separated strings, so pane
//! navigation and transfer path mapping never go through `std::path`.

/// Lexically normalize a location: collapse duplicate slashes, `.` and `..`.
/// `..` never climbs above the root of an absolute location.
pub fn clean(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Append `name` to `base` and normalize the result.
pub fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        return clean(name);
    }
    clean(&format!("{}/{}", base, name))
}

/// Parent location. The parent of `/` is `/`.
pub fn parent(location: &str) -> String {
    join(location, "..")
}

/// The suffix of `path` below `root`, or `None` if `path` is not inside `root`.
/// `root` itself maps to the empty string.
pub fn relative_to(root: &str, path: &str) -> Option<String> {
    let root = clean(root);
    let path = clean(path);

    if path == root {
        return Some(String::new());
    }

    // Every cleaned relative path lives under "." unless it climbs out
    if root == "." {
        let climbs = path == ".." || path.starts_with("../") || path.starts_with('/');
        return if climbs { None } else { Some(path) };
    }

    let prefix = if root.ends_with('/') {
        root
    } else {
        format!("{}/", root)
    };

    path.strip_prefix(&prefix).map(str::to_string)
}

/// Last component of a location.
pub fn file_name(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}
