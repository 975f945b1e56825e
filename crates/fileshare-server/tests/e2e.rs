//! End-to-end scenarios driven over real TCP connections, using
//! `fileshare-client` against a server bound to an ephemeral port.
//!
//! Each test mirrors one of the scenario walkthroughs: login, mkdir plus
//! list-dir, the upload/download round trip, cross-user permission
//! enforcement, search, and the primary-admin protection invariant.

use fileshare_client::{Client, ClientError};
use fileshare_proto::{
    Opcode,
    payloads::{
        AdminCreateUserRequest, AdminDeleteUserRequest, ChmodRequest, DeleteRequest, DownloadRequest,
        FileInfoResponse, ListDirRequest, ListDirResponse, LoginRequest, LoginResponse, MkdirRequest,
        SearchRequest, SearchResponse, SuccessResponse, UploadRequest,
    },
};
use fileshare_server::{Server, ServerConfig};
use tempfile::TempDir;

/// Keeps the temp directories and shutdown channel alive for the test's
/// duration; dropping it tears the fixture down.
struct TestServer {
    addr: std::net::SocketAddr,
    shutdown: tokio::sync::watch::Sender<bool>,
    _db_dir: TempDir,
    _storage_dir: TempDir,
}

impl TestServer {
    async fn spawn() -> Self {
        let db_dir = tempfile::tempdir().expect("tempdir");
        let storage_dir = tempfile::tempdir().expect("tempdir");

        let config = ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            db_path: db_dir.path().join("fileshare.db"),
            storage_path: storage_dir.path().to_path_buf(),
            ..ServerConfig::default()
        };

        // The metadata store bootstraps the primary admin (id=1, username
        // "admin", password "admin") itself on first open; no manual seed
        // call is needed here.
        let server = Server::open(config).expect("open server");

        let bound = server.bind().await.expect("bind");
        let addr = bound.local_addr().expect("local addr");

        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        tokio::spawn(bound.run(shutdown_rx));

        Self { addr, shutdown: shutdown_tx, _db_dir: db_dir, _storage_dir: storage_dir }
    }

    async fn connect(&self) -> Client {
        Client::connect(&self.addr.to_string()).await.expect("connect")
    }

    async fn admin_client(&self) -> Client {
        let mut client = self.connect().await;
        login(&mut client, "admin", "admin").await;
        client
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

async fn login(client: &mut Client, username: &str, password: &str) -> LoginResponse {
    let req = LoginRequest { username: username.to_string(), password: password.to_string() };
    client.call(Opcode::LoginRequest, &req).await.expect("login")
}

// E1: connect, log in as the seeded admin account, and confirm the
// credentials and admin flag come back correctly.
#[tokio::test]
async fn login_returns_admin_identity() {
    let server = TestServer::spawn().await;
    let mut client = server.connect().await;

    let resp = login(&mut client, "admin", "admin").await;

    assert!(resp.success);
    assert_eq!(resp.user_id, Some(1));
    assert_eq!(resp.is_admin, Some(true));
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let server = TestServer::spawn().await;
    let mut client = server.connect().await;

    let req = LoginRequest { username: "admin".to_string(), password: "wrong".to_string() };
    let result: Result<LoginResponse, ClientError> = client.call(Opcode::LoginRequest, &req).await;

    assert_server_error_kind(&result, "invalid_credentials");
}

fn assert_server_error_kind<T: std::fmt::Debug>(result: &Result<T, ClientError>, expected_kind: &str) {
    match result {
        Err(ClientError::Server { kind, .. }) => assert_eq!(kind, expected_kind),
        other => panic!("expected server error {expected_kind:?}, got {other:?}"),
    }
}

#[tokio::test]
async fn commands_before_login_are_rejected() {
    let server = TestServer::spawn().await;
    let mut client = server.connect().await;

    let result: Result<ListDirResponse, ClientError> =
        client.call(Opcode::ListDir, &ListDirRequest::default()).await;

    assert_server_error_kind(&result, "bad_state");
}

// E2: mkdir, then confirm list-dir reflects exactly the new entry.
#[tokio::test]
async fn mkdir_then_list_dir_shows_the_new_directory() {
    let server = TestServer::spawn().await;
    let mut client = server.admin_client().await;

    let created: FileInfoResponse = client
        .call(Opcode::Mkdir, &MkdirRequest { name: "docs".to_string(), parent_id: None })
        .await
        .expect("mkdir");
    assert!(created.is_directory);
    assert_eq!(created.name, "docs");
    assert!(created.file_id > 0);

    let listing: ListDirResponse =
        client.call(Opcode::ListDir, &ListDirRequest::default()).await.expect("list-dir");
    assert_eq!(listing.entries.len(), 1);
    assert_eq!(listing.entries[0].file_id, created.file_id);
    assert_eq!(listing.entries[0].name, "docs");
    assert!(listing.entries[0].is_directory);
    assert_eq!(listing.entries[0].owner_id, 1);
}

// E3: upload-request then upload-data then download-request round trip the
// same bytes.
#[tokio::test]
async fn upload_then_download_round_trips_the_file_bytes() {
    let server = TestServer::spawn().await;
    let mut client = server.admin_client().await;

    let docs: FileInfoResponse = client
        .call(Opcode::Mkdir, &MkdirRequest { name: "docs".to_string(), parent_id: None })
        .await
        .expect("mkdir");

    let upload_ack: SuccessResponse = client
        .call(
            Opcode::UploadRequest,
            &UploadRequest { name: "a.txt".to_string(), size: 5, parent_id: Some(docs.file_id) },
        )
        .await
        .expect("upload-request");
    assert!(upload_ack.message.is_some(), "upload-request should echo the reserved blob id");

    let data_ack: SuccessResponse =
        client.send_bytes(Opcode::UploadData, b"hello".to_vec()).await.expect("upload-data");
    assert!(data_ack.message.is_some());

    let listing: ListDirResponse =
        client.call(Opcode::ListDir, &ListDirRequest { directory_id: Some(docs.file_id) }).await.expect("list-dir");
    let file_id = listing.entries.iter().find(|e| e.name == "a.txt").expect("a.txt listed").file_id;

    let bytes = client.download(&DownloadRequest { file_id }).await.expect("download");
    assert_eq!(bytes, b"hello");
}

#[tokio::test]
async fn upload_data_size_mismatch_is_rejected() {
    let server = TestServer::spawn().await;
    let mut client = server.admin_client().await;

    let docs: FileInfoResponse = client
        .call(Opcode::Mkdir, &MkdirRequest { name: "docs".to_string(), parent_id: None })
        .await
        .expect("mkdir");
    client
        .call::<_, SuccessResponse>(
            Opcode::UploadRequest,
            &UploadRequest { name: "a.txt".to_string(), size: 5, parent_id: Some(docs.file_id) },
        )
        .await
        .expect("upload-request");

    let result: Result<SuccessResponse, ClientError> =
        client.send_bytes(Opcode::UploadData, b"too long for five bytes".to_vec()).await;
    assert_server_error_kind(&result, "bad_request");
}

// E4: a second, unprivileged user can read a world-readable file but cannot
// chmod or delete it.
#[tokio::test]
async fn non_owner_can_read_but_not_modify_or_delete() {
    let server = TestServer::spawn().await;
    let mut admin = server.admin_client().await;

    let docs: FileInfoResponse = admin
        .call(Opcode::Mkdir, &MkdirRequest { name: "docs".to_string(), parent_id: None })
        .await
        .expect("mkdir");
    admin
        .call::<_, SuccessResponse>(
            Opcode::UploadRequest,
            &UploadRequest { name: "a.txt".to_string(), size: 5, parent_id: Some(docs.file_id) },
        )
        .await
        .expect("upload-request");
    admin.send_bytes::<SuccessResponse>(Opcode::UploadData, b"hello".to_vec()).await.expect("upload-data");

    let listing: ListDirResponse = admin
        .call(Opcode::ListDir, &ListDirRequest { directory_id: Some(docs.file_id) })
        .await
        .expect("list-dir");
    let file_id = listing.entries.iter().find(|e| e.name == "a.txt").expect("a.txt listed").file_id;

    admin
        .call::<_, SuccessResponse>(
            Opcode::AdminCreateUser,
            &AdminCreateUserRequest { username: "bob".to_string(), password: "pw".to_string(), is_admin: false },
        )
        .await
        .expect("create bob");

    let mut bob = server.connect().await;
    let bob_login = login(&mut bob, "bob", "pw").await;
    assert!(bob_login.success);

    let bytes = bob.download(&DownloadRequest { file_id }).await.expect("bob can read");
    assert_eq!(bytes, b"hello");

    let chmod_result: Result<SuccessResponse, ClientError> = bob
        .call(Opcode::Chmod, &ChmodRequest { file_id, permissions: "600".to_string() })
        .await;
    assert_server_error_kind(&chmod_result, "permission_denied");

    let delete_result: Result<SuccessResponse, ClientError> =
        bob.call(Opcode::Delete, &DeleteRequest { file_id }).await;
    assert_server_error_kind(&delete_result, "permission_denied");
}

// E5: search finds the uploaded file by a glob pattern under its parent.
#[tokio::test]
async fn search_finds_matching_file_by_glob() {
    let server = TestServer::spawn().await;
    let mut client = server.admin_client().await;

    let docs: FileInfoResponse = client
        .call(Opcode::Mkdir, &MkdirRequest { name: "docs".to_string(), parent_id: None })
        .await
        .expect("mkdir");
    client
        .call::<_, SuccessResponse>(
            Opcode::UploadRequest,
            &UploadRequest { name: "a.txt".to_string(), size: 5, parent_id: Some(docs.file_id) },
        )
        .await
        .expect("upload-request");
    client.send_bytes::<SuccessResponse>(Opcode::UploadData, b"hello".to_vec()).await.expect("upload-data");

    let results: SearchResponse = client
        .call(
            Opcode::SearchRequest,
            &SearchRequest {
                directory_id: docs.file_id,
                pattern: "a*".to_string(),
                recursive: false,
                limit: None,
            },
        )
        .await
        .expect("search");

    assert_eq!(results.matches.len(), 1);
    assert_eq!(results.matches[0].name, "a.txt");
}

// E6: the primary admin account can never be deleted, even by itself, and
// remains able to log in afterward.
#[tokio::test]
async fn primary_admin_cannot_be_deleted() {
    let server = TestServer::spawn().await;
    let mut client = server.admin_client().await;

    let result: Result<SuccessResponse, ClientError> =
        client.call(Opcode::AdminDeleteUser, &AdminDeleteUserRequest { user_id: 1 }).await;
    assert_server_error_kind(&result, "permission_denied");

    let mut second_connection = server.connect().await;
    let relogin = login(&mut second_connection, "admin", "admin").await;
    assert!(relogin.success);
}

#[tokio::test]
async fn admin_cannot_delete_other_admin_accounts_protection_path() {
    let server = TestServer::spawn().await;
    let mut admin = server.admin_client().await;

    let create: SuccessResponse = admin
        .call(
            Opcode::AdminCreateUser,
            &AdminCreateUserRequest {
                username: "root2".to_string(),
                password: "pw".to_string(),
                is_admin: true,
            },
        )
        .await
        .expect("create second admin");
    assert!(create.message.is_some());

    // A non-primary admin can be deleted; only id 1 is protected.
    let users: fileshare_proto::payloads::AdminListUsersResponse =
        admin.call(Opcode::AdminListUsers, &()).await.expect("list users");
    let root2 = users.users.iter().find(|u| u.username == "root2").expect("root2 present");

    let deleted: SuccessResponse = admin
        .call(Opcode::AdminDeleteUser, &AdminDeleteUserRequest { user_id: root2.user_id })
        .await
        .expect("delete non-primary admin");
    assert!(deleted.message.is_some());
}
