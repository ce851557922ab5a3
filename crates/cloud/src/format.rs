//! Upload format checks and public-id derivation.

/// File formats accepted for order images.
pub const ALLOWED_FORMATS: &[&str] = &["jpg", "jpeg", "png", "pdf"];

/// Incoming transformation applied to every order image: cap the width at
/// 1000px and let the host pick quality and delivery format.
pub const ORDER_IMAGE_TRANSFORMATION: &str = "w_1000,c_limit,q_auto:good,f_auto,fl_lossy";

/// Detect the format of an upload from its filename extension, falling back
/// to the MIME subtype.
///
/// Returns the lowercase format name, or `None` if neither source gives one.
pub fn detect_format(filename: &str, content_type: Option<&str>) -> Option<String> {
    let from_name = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty());

    from_name.or_else(|| {
        content_type
            .and_then(|ct| ct.split(';').next())
            .and_then(|ct| ct.rsplit_once('/'))
            .map(|(_, subtype)| subtype.trim().to_ascii_lowercase())
            .filter(|subtype| !subtype.is_empty())
    })
}

/// `true` if the upload's detected format is in [`ALLOWED_FORMATS`].
pub fn is_allowed_format(filename: &str, content_type: Option<&str>) -> bool {
    detect_format(filename, content_type)
        .is_some_and(|format| ALLOWED_FORMATS.contains(&format.as_str()))
}

/// Derive the host public id for a stored image URL.
///
/// Takes the last path segment, drops any query string and extension, and
/// prefixes `folder`. Returns `None` when the URL has no usable filename.
pub fn public_id_from_url(url: &str, folder: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let filename = path.rsplit('/').next().unwrap_or_default();
    let stem = match filename.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => filename,
    };

    if stem.is_empty() {
        return None;
    }
    let folder = folder.trim_end_matches('/');
    if folder.is_empty() {
        Some(stem.to_string())
    } else {
        Some(format!("{folder}/{stem}"))
    }
}
