use kernel::interface::normalize::{DependOnUrlNormalizer, Operation, UrlNormalizer};
use kernel::KernelError;

use crate::transfer::{ProcessUrlDto, ProcessedUrlDto};

pub trait ProcessUrlService: 'static + Sync + Send + DependOnUrlNormalizer {
    fn process_url(&self, dto: ProcessUrlDto) -> error_stack::Result<ProcessedUrlDto, KernelError> {
        let operation = dto.operation.parse::<Operation>()?;
        let processed_url = self.url_normalizer().normalize(&dto.url, operation)?;
        Ok(ProcessedUrlDto { processed_url })
    }
}

impl<T> ProcessUrlService for T where T: DependOnUrlNormalizer {}
