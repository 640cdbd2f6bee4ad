//! Safe-ish conversions between rust and sql types.

use super::*;

pub fn i32_to_u32(i: i32) -> Result<u32, String> {
    if i < 0 {
        Err("i32 value is negative and cannot be converted to u32".to_string())
    } else {
        Ok(i as u32)
    }
}
pub fn u32_to_i32(i: u32) -> Result<i32, String> {
    if i > i32::MAX as u32 {
        Err("u32 value exceeds i32::MAX and cannot be converted to i32".to_string())
    } else {
        Ok(i as i32)
    }
}

pub fn u32s_to_i32s(i: &[u32]) -> Result<Vec<i32>, String> {
    i.iter().copied().map(u32_to_i32).collect()
}

pub fn i32_to_rating(i: i32) -> Result<u8, String> {
    match u8::try_from(i) {
        Ok(r) if (MIN_RATING..=MAX_RATING).contains(&r) => Ok(r),
        _ => Err(format!("stored rating {i} is outside 1-5")),
    }
}
pub fn rating_to_i32(i: u8) -> Result<i32, String> {
    Ok(i32::from(i))
}

pub fn deserialize_category(i: String) -> Result<Category, String> {
    i.parse().map_err(|e: ShowcaseError| e.to_string())
}
pub fn serialize_category(i: Category) -> String {
    i.as_str().to_string()
}

pub fn deserialize_status(i: String) -> Result<PitchStatus, String> {
    i.parse().map_err(|e: ShowcaseError| e.to_string())
}
pub fn serialize_status(i: PitchStatus) -> String {
    i.as_str().to_string()
}

pub fn deserialize_role(i: String) -> Result<UserRole, String> {
    i.parse().map_err(|e: ShowcaseError| e.to_string())
}
pub fn serialize_role(i: UserRole) -> String {
    i.as_str().to_string()
}

pub fn deserialize_members(i: Value) -> Result<Vec<TeamMember>, String> {
    serde_json::from_value(i).map_err(|e| e.to_string())
}
pub fn serialize_members(i: Vec<TeamMember>) -> Result<Value, String> {
    serde_json::to_value(i).map_err(|e| e.to_string())
}

/// Escape `%`, `_` and `\` so user input matches literally inside a LIKE pattern.
pub fn escape_like(i: &str) -> String {
    let mut escaped = String::with_capacity(i.len());
    for c in i.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_id_conversions() {
        assert_eq!(i32_to_u32(7), Ok(7));
        assert!(i32_to_u32(-1).is_err());
        assert_eq!(u32_to_i32(7), Ok(7));
        assert!(u32_to_i32(u32::MAX).is_err());
    }

    #[test_log::test]
    fn test_rating_conversions() {
        assert_eq!(i32_to_rating(4), Ok(4));
        assert!(i32_to_rating(0).is_err());
        assert!(i32_to_rating(300).is_err());
    }

    #[test_log::test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
