//! Multipart upload orchestration.
//!
//! A large file is split into consecutive chunks of the configured part
//! size (the last chunk may be smaller), numbered 1..N, and uploaded
//! strictly in order. Each part gets a bounded number of immediate
//! re-attempts; once the budget is spent the whole upload is aborted so the
//! remote store does not keep the session open. Finalize runs only when
//! every chunk succeeded, with the part list in upload order.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::errors::{StoreError, StoreResult};
use crate::models::multipart::{PartResult, UploadSession};

use super::session::StoreSession;

impl StoreSession {
    /// Upload every chunk of `reader`, then finalize or abort `upload`.
    ///
    /// The session handle always reaches a terminal state here: on any part
    /// failure (remote or local read) the upload is aborted exactly once
    /// before the error is returned. An abort failure is reported together
    /// with the upload error that triggered it, never instead of it.
    pub(crate) async fn run_multipart_upload(
        &self,
        reader: &mut (impl AsyncRead + Unpin),
        file_size: u64,
        upload: &UploadSession,
    ) -> StoreResult<()> {
        match self.upload_parts(reader, file_size, upload).await {
            Ok(parts) => {
                self.backend.complete_multipart_upload(upload, &parts).await?;
                self.log_op(
                    "upload-large-file",
                    &upload.bucket,
                    &upload.key,
                    &format!("completed multipart upload of {} parts", parts.len()),
                );
                Ok(())
            }
            Err((part_number, upload_error)) => {
                self.log_op(
                    "upload-large-file",
                    &upload.bucket,
                    &upload.key,
                    &format!("part {part_number} failed, aborting upload `{}`", upload.upload_id),
                );
                match self.backend.abort_multipart_upload(upload).await {
                    Ok(()) => Err(StoreError::UploadAborted {
                        part_number,
                        source: Box::new(upload_error),
                    }),
                    Err(abort_error) => Err(StoreError::AbortFailed {
                        upload_id: upload.upload_id.clone(),
                        abort_error: Box::new(abort_error),
                        upload_error: Box::new(upload_error),
                    }),
                }
            }
        }
    }

    /// Slice the reader into parts and upload them sequentially.
    ///
    /// Errors carry the number of the part that was being processed.
    async fn upload_parts(
        &self,
        reader: &mut (impl AsyncRead + Unpin),
        file_size: u64,
        upload: &UploadSession,
    ) -> Result<Vec<PartResult>, (i32, StoreError)> {
        let part_size = (self.config.part_size as u64).max(1);
        let mut remaining = file_size;
        let mut part_number: i32 = 1;
        let mut completed = Vec::with_capacity(file_size.div_ceil(part_size) as usize);

        while remaining > 0 {
            let current = remaining.min(part_size) as usize;
            let mut buf = vec![0u8; current];
            if let Err(err) = reader.read_exact(&mut buf).await {
                return Err((part_number, StoreError::Io(err)));
            }

            let part = self
                .upload_part_with_retry(upload, part_number, Bytes::from(buf))
                .await
                .map_err(|err| (part_number, err))?;
            completed.push(part);

            remaining -= current as u64;
            self.log_op(
                "upload-part",
                &upload.bucket,
                &upload.key,
                &format!("part {part_number} complete, {remaining} bytes remaining"),
            );
            part_number += 1;
        }

        Ok(completed)
    }

    /// Upload one part, re-attempting immediately on failure until the
    /// retry budget is spent. Retries are idempotent on the store side: a
    /// re-upload of the same part number overwrites the prior attempt.
    async fn upload_part_with_retry(
        &self,
        upload: &UploadSession,
        part_number: i32,
        chunk: Bytes,
    ) -> StoreResult<PartResult> {
        let retries = self.config.part_retries;
        let mut attempt: u32 = 0;
        loop {
            match self
                .backend
                .upload_part(upload, part_number, chunk.clone())
                .await
            {
                Ok(etag) => return Ok(PartResult { part_number, etag }),
                Err(err) => {
                    self.log_op(
                        "upload-part",
                        &upload.bucket,
                        &upload.key,
                        &format!("part {part_number} attempt {attempt} failed: {err}"),
                    );
                    if attempt >= retries {
                        return Err(StoreError::PartRetriesExhausted {
                            part_number,
                            attempts: attempt + 1,
                            source: Box::new(err),
                        });
                    }
                    attempt += 1;
                }
            }
        }
    }
}
