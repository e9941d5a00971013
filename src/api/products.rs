//! # Product Routes
//!
//! CRUD for `product_master`. Create and update take multipart form data so
//! up to three binary image parts can ride along with the text fields; the
//! parts are held in memory for the duration of the request. Images go out
//! base64-encoded via the row conversion in [`crate::db`].
//!
//! Product fields carry no application-side validation: the store's NOT NULL
//! and UNIQUE constraints are the only checks, matching the original service.

use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use super::error::{ApiError, ApiResult};
use super::envelope::Envelope;
use super::AppState;
use crate::db::row_to_json;

const INSERT_PRODUCT: &str = "
    INSERT INTO product_master
        (product_name, product_image, registration_number, manufactured_by,
         cautionary_symbol_image, antidotes_statement, marked_by,
         customer_care_details, gstin, product_instruction_image)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
    RETURNING *";

// Absent image parts keep the stored bytes; everything else is overwritten.
const UPDATE_PRODUCT: &str = "
    UPDATE product_master
    SET product_name = $1,
        product_image = COALESCE($2, product_image),
        registration_number = $3,
        manufactured_by = $4,
        cautionary_symbol_image = COALESCE($5, cautionary_symbol_image),
        antidotes_statement = $6,
        marked_by = $7,
        customer_care_details = $8,
        gstin = $9,
        product_instruction_image = COALESCE($10, product_instruction_image)
    WHERE id = $11
    RETURNING *";

/// Create product routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// Text fields and in-memory image parts of a product request
#[derive(Debug, Default)]
struct ProductForm {
    product_name: Option<String>,
    registration_number: Option<String>,
    manufactured_by: Option<String>,
    antidotes_statement: Option<String>,
    marked_by: Option<String>,
    customer_care_details: Option<String>,
    gstin: Option<String>,
    product_image: Option<Vec<u8>>,
    cautionary_symbol_image: Option<Vec<u8>>,
    product_instruction_image: Option<Vec<u8>>,
}

impl ProductForm {
    /// Drain the multipart stream into a form. Unknown parts are ignored;
    /// empty image parts count as absent.
    async fn from_multipart(multipart: &mut Multipart) -> ApiResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(bad_part)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match name.as_str() {
                "product_image" | "cautionary_symbol_image" | "product_instruction_image" => {
                    let bytes = field.bytes().await.map_err(bad_part)?;
                    let bytes = (!bytes.is_empty()).then(|| bytes.to_vec());
                    match name.as_str() {
                        "product_image" => form.product_image = bytes,
                        "cautionary_symbol_image" => form.cautionary_symbol_image = bytes,
                        _ => form.product_instruction_image = bytes,
                    }
                }
                "product_name" => form.product_name = Some(field.text().await.map_err(bad_part)?),
                "registration_number" => {
                    form.registration_number = Some(field.text().await.map_err(bad_part)?)
                }
                "manufactured_by" => {
                    form.manufactured_by = Some(field.text().await.map_err(bad_part)?)
                }
                "antidotes_statement" => {
                    form.antidotes_statement = Some(field.text().await.map_err(bad_part)?)
                }
                "marked_by" => form.marked_by = Some(field.text().await.map_err(bad_part)?),
                "customer_care_details" => {
                    form.customer_care_details = Some(field.text().await.map_err(bad_part)?)
                }
                "gstin" => form.gstin = Some(field.text().await.map_err(bad_part)?),
                _ => {}
            }
        }

        Ok(form)
    }
}

fn bad_part(e: MultipartError) -> ApiError {
    ApiError::BadRequest(e.to_string())
}

// Extractor wrapper so a non-multipart body answers with the envelope
// instead of axum's plain-text rejection.
impl<S: Send + Sync> FromRequest<S> for ProductForm {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Self::from_multipart(&mut multipart).await
    }
}

async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Envelope>> {
    let rows = sqlx::query("SELECT * FROM product_master")
        .fetch_all(&state.pool)
        .await?;

    let products: Vec<Value> = rows.iter().map(row_to_json).collect();
    Ok(Json(Envelope::ok(
        "Products retrieved successfully!",
        Value::Array(products),
    )))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Envelope>> {
    let row = sqlx::query("SELECT * FROM product_master WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ApiError::NotFound("Product"))?;

    Ok(Json(Envelope::ok(
        "Product retrieved successfully!",
        row_to_json(&row),
    )))
}

async fn create_product(
    State(state): State<AppState>,
    form: ProductForm,
) -> ApiResult<(StatusCode, Json<Envelope>)> {
    let row = sqlx::query(INSERT_PRODUCT)
        .bind(&form.product_name)
        .bind(&form.product_image)
        .bind(&form.registration_number)
        .bind(&form.manufactured_by)
        .bind(&form.cautionary_symbol_image)
        .bind(&form.antidotes_statement)
        .bind(&form.marked_by)
        .bind(&form.customer_care_details)
        .bind(&form.gstin)
        .bind(&form.product_instruction_image)
        .fetch_one(&state.pool)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(
            "Product created successfully!",
            row_to_json(&row),
        )),
    ))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    form: ProductForm,
) -> ApiResult<Json<Envelope>> {
    let row = sqlx::query(UPDATE_PRODUCT)
        .bind(&form.product_name)
        .bind(&form.product_image)
        .bind(&form.registration_number)
        .bind(&form.manufactured_by)
        .bind(&form.cautionary_symbol_image)
        .bind(&form.antidotes_statement)
        .bind(&form.marked_by)
        .bind(&form.customer_care_details)
        .bind(&form.gstin)
        .bind(&form.product_instruction_image)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ApiError::NotFound("Product"))?;

    Ok(Json(Envelope::ok(
        "Product updated successfully!",
        row_to_json(&row),
    )))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Envelope>> {
    let row = sqlx::query("DELETE FROM product_master WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ApiError::NotFound("Product"))?;

    Ok(Json(Envelope::ok(
        "Product deleted successfully!",
        row_to_json(&row),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header;

    const BOUNDARY: &str = "test-boundary";

    /// Build a multipart request from (name, filename, content) parts.
    fn multipart_request(parts: &[(&str, Option<&str>, &[u8])]) -> Request {
        let mut body = Vec::new();
        for (name, filename, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match filename {
                Some(filename) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request should build")
    }

    #[tokio::test]
    async fn test_form_collects_text_fields_and_image_bytes() {
        let request = multipart_request(&[
            ("product_name", None, b"Acme Widget"),
            ("registration_number", None, b"REG-1"),
            ("manufactured_by", None, b"Acme Corp"),
            ("product_image", Some("p.png"), b"\x89PNG bytes"),
        ]);

        let form = ProductForm::from_request(request, &())
            .await
            .expect("form should parse");

        assert_eq!(form.product_name.as_deref(), Some("Acme Widget"));
        assert_eq!(form.registration_number.as_deref(), Some("REG-1"));
        assert_eq!(form.manufactured_by.as_deref(), Some("Acme Corp"));
        assert_eq!(form.product_image.as_deref(), Some(b"\x89PNG bytes".as_slice()));
        assert!(form.cautionary_symbol_image.is_none());
        assert!(form.product_instruction_image.is_none());
    }

    #[tokio::test]
    async fn test_empty_image_part_counts_as_absent() {
        // An empty file part must not clobber stored bytes on update, so it
        // parses to None and COALESCE keeps the previous image.
        let request = multipart_request(&[
            ("product_name", None, b"Acme Widget"),
            ("product_image", Some("p.png"), b""),
        ]);

        let form = ProductForm::from_request(request, &())
            .await
            .expect("form should parse");

        assert!(form.product_image.is_none());
    }

    #[tokio::test]
    async fn test_unknown_parts_are_ignored() {
        let request = multipart_request(&[
            ("mystery_field", None, b"whatever"),
            ("gstin", None, b"29ABCDE1234F1Z5"),
        ]);

        let form = ProductForm::from_request(request, &())
            .await
            .expect("form should parse");

        assert_eq!(form.gstin.as_deref(), Some("29ABCDE1234F1Z5"));
        assert!(form.product_name.is_none());
    }

    #[tokio::test]
    async fn test_non_multipart_body_is_a_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .expect("request should build");

        let result = ProductForm::from_request(request, &()).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_update_preserves_images_when_no_replacement_is_supplied() {
        for column in [
            "product_image",
            "cautionary_symbol_image",
            "product_instruction_image",
        ] {
            assert!(
                UPDATE_PRODUCT.contains(&format!("{column} = COALESCE(")),
                "{column} must merge on null"
            );
        }
    }

    #[test]
    fn test_update_overwrites_non_image_fields_unconditionally() {
        assert!(UPDATE_PRODUCT.contains("product_name = $1,"));
        assert!(UPDATE_PRODUCT.contains("registration_number = $3,"));
        assert!(!UPDATE_PRODUCT.contains("product_name = COALESCE"));
    }
}
