use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{is_student, Claims},
    errors::{AppError, AppResult},
    models::{
        domain::Test,
        dto::{
            request::{PatchTestRequest, TestRequest},
            response::{PaginatedResponse, TestDto},
        },
    },
    repositories::{FolderRepository, TestRepository},
    services::cascade::CascadeDeleter,
};

pub struct TestService {
    tests: Arc<dyn TestRepository>,
    folders: Arc<dyn FolderRepository>,
    cascade: Arc<CascadeDeleter>,
}

impl TestService {
    pub fn new(
        tests: Arc<dyn TestRepository>,
        folders: Arc<dyn FolderRepository>,
        cascade: Arc<CascadeDeleter>,
    ) -> Self {
        Self {
            tests,
            folders,
            cascade,
        }
    }

    pub async fn create_test(&self, request: TestRequest) -> AppResult<TestDto> {
        request.validate()?;
        let section_type = request.section_type().map_err(AppError::ValidationError)?;
        self.ensure_folder_exists(&request.folder).await?;

        let test = Test::new(
            &request.folder,
            &request.title,
            request.section_number,
            section_type,
            request.delta,
        );
        let test = self.tests.create(test).await?;

        log::info!(
            "Created {} test '{}' in folder {}",
            test.section_type,
            test.title,
            test.folder_id
        );
        Ok(test.into())
    }

    pub async fn get_test(&self, id: &str) -> AppResult<TestDto> {
        self.find_test(id).await.map(TestDto::from)
    }

    pub async fn list_tests(
        &self,
        folder_id: Option<String>,
        offset: i64,
        limit: i64,
    ) -> AppResult<PaginatedResponse<TestDto>> {
        let (tests, total) = self.tests.list(folder_id, offset, limit).await?;
        Ok(PaginatedResponse::new(tests, offset, limit, total).map(TestDto::from))
    }

    /// Lists a folder's tests. Admins need no code; students must present the
    /// folder's access code on every call.
    pub async fn list_folder_tests(
        &self,
        caller: &Claims,
        folder_id: &str,
        code: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> AppResult<PaginatedResponse<TestDto>> {
        let folder = self
            .folders
            .find_by_id(folder_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Folder with id '{}' not found", folder_id)))?;

        if is_student(caller) && !folder.code_matches(code.unwrap_or_default()) {
            return Err(AppError::WrongCode);
        }

        self.list_tests(Some(folder.id), offset, limit).await
    }

    pub async fn replace_test(&self, id: &str, request: TestRequest) -> AppResult<TestDto> {
        request.validate()?;
        let section_type = request.section_type().map_err(AppError::ValidationError)?;

        let mut test = self.find_test(id).await?;
        if request.folder != test.folder_id {
            self.ensure_folder_exists(&request.folder).await?;
        }

        test.folder_id = request.folder;
        test.title = request.title;
        test.section_number = request.section_number;
        test.section_type = section_type;
        test.delta = request.delta;

        let test = self.tests.update(test).await?;
        Ok(test.into())
    }

    pub async fn patch_test(&self, id: &str, request: PatchTestRequest) -> AppResult<TestDto> {
        request.validate()?;
        let section_type = request.section_type().map_err(AppError::ValidationError)?;

        let mut test = self.find_test(id).await?;
        if let Some(folder) = request.folder {
            if folder != test.folder_id {
                self.ensure_folder_exists(&folder).await?;
            }
            test.folder_id = folder;
        }
        if let Some(title) = request.title {
            test.title = title;
        }
        if let Some(section_number) = request.section_number {
            test.section_number = section_number;
        }
        if let Some(section_type) = section_type {
            test.section_type = section_type;
        }
        if let Some(delta) = request.delta {
            test.delta = delta;
        }

        let test = self.tests.update(test).await?;
        Ok(test.into())
    }

    pub async fn delete_test(&self, id: &str) -> AppResult<()> {
        let test = self.find_test(id).await?;
        self.cascade.delete_tests(&[test.id.clone()]).await?;
        log::info!("Deleted test '{}'", test.title);
        Ok(())
    }

    async fn find_test(&self, id: &str) -> AppResult<Test> {
        self.tests
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test with id '{}' not found", id)))
    }

    async fn ensure_folder_exists(&self, folder_id: &str) -> AppResult<()> {
        if self.folders.find_by_id(folder_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Folder with id '{}' not found",
                folder_id
            )));
        }
        Ok(())
    }
}
