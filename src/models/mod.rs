/// One resolution variant of an uploaded photo.
#[derive(Debug, Clone)]
pub struct PhotoVariant {
    pub file_id: String,
    pub file_unique_id: String, // stable across bots, used for temp file names
    pub width: u32,
    pub height: u32,
    pub file_size: u32,
}

impl PhotoVariant {
    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sender {
    pub username: Option<String>,
    pub first_name: Option<String>,
}

impl Sender {
    /// Name used in replies: platform handle first, then display name.
    pub fn handle(&self) -> &str {
        self.username
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| self.first_name.as_deref().filter(|n| !n.is_empty()))
            .unwrap_or("there")
    }
}

/// A chat message that carried at least one photo.
#[derive(Debug, Clone)]
pub struct IncomingPhoto {
    pub chat_id: i64,
    pub message_id: i32,
    pub variants: Vec<PhotoVariant>,
    pub caption: Option<String>,
    pub sender: Sender,
}

impl IncomingPhoto {
    /// Variant with the largest pixel area. Ties go to the bigger file, then to
    /// the later entry since platforms list sizes in ascending order.
    pub fn select_largest(&self) -> Option<&PhotoVariant> {
        self.variants
            .iter()
            .max_by_key(|v| (v.pixels(), v.file_size))
    }
}
