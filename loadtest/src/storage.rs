//! Storage keys for files served from `/file/public/<id>/<name>`.
use crate::error::KeyError;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

/// Characters escaped when a key segment is placed back into a URL path.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Extract `<id>/<name>` from a file URL, percent-decoding both segments.
///
/// ```
/// use planx_loadtest::storage::file_key;
///
/// let key = file_key("http://h/file/public/cuk684uo/guide.pdf").unwrap();
/// assert_eq!(key, "cuk684uo/guide.pdf");
/// ```
pub fn file_key(file_url: &str) -> Result<String, KeyError> {
    let url = Url::parse(file_url).map_err(|err| KeyError::Parse(file_url.to_string(), err))?;
    let segments: Vec<&str> = url
        .path_segments()
        .ok_or_else(|| KeyError::NoPath(file_url.to_string()))?
        .collect();

    let [.., id, name] = segments.as_slice() else {
        return Err(KeyError::TooShort(file_url.to_string()));
    };
    if id.is_empty() || name.is_empty() {
        return Err(KeyError::TooShort(file_url.to_string()));
    }

    Ok(format!("{}/{}", decode(id)?, decode(name)?))
}

/// Path used to delete the file stored under `key`.
pub fn delete_path(key: &str) -> String {
    let encoded: Vec<String> = key
        .split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect();
    format!("/file/public/{}", encoded.join("/"))
}

fn decode(segment: &str) -> Result<String, KeyError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| KeyError::Encoding(segment.to_string()))
}
