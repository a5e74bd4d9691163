#[derive(Debug, Clone)]
pub struct ProcessUrlDto {
    pub url: String,
    pub operation: String,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProcessedUrlDto {
    pub processed_url: String,
}
