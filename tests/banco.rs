// Testes contra um Postgres real: cada teste recebe um banco novo com as
// migrações aplicadas (`DATABASE_URL` deve apontar para um servidor acessível).

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use retaguarda::{
    common::{error::AppError, import::MOTIVO_JA_EXISTE},
    config::{AppConfig, AppState},
    models::{
        auth::Identidade,
        autorizacao_compra::{
            AtualizarAutorizacaoPayload, CreateAutorizacaoPayload, FiltroAutorizacoes,
        },
        meta::{ImportarMetasPayload, ItemImportacaoMeta},
        produto::{Bandeira, ImportarEtiquetasPayload},
    },
};

fn state(pool: PgPool) -> AppState {
    let cfg = AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://ignorado/ignorado".into()),
        "JWT_SECRET" => Some("segredo".into()),
        "PASSWORD_HASH_KEY" => Some("chave".into()),
        _ => None,
    })
    .unwrap();
    AppState::from_pool(cfg, pool)
}

fn quem(usuario: &str, nivel: &str) -> Identidade {
    Identidade {
        usuario: usuario.into(),
        codusuario: 1,
        nivel: nivel.into(),
    }
}

fn pedido(loja: &str) -> CreateAutorizacaoPayload {
    CreateAutorizacaoPayload {
        loja: loja.into(),
        setor: "A".into(),
        fornecedor: "X".into(),
        valor: Decimal::from(100),
        observacao: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn purchase_authorization_full_cycle(pool: PgPool) {
    let st = state(pool);
    let svc = &st.autorizacao_service;
    let joao = quem("JOAO", "04");
    let controller = quem("ANA", "02");
    let diretor = quem("CEO", "01");

    let criada = svc.create(&joao, &pedido("01")).await.unwrap();
    assert!(!criada.autorizado_controladoria);
    assert!(!criada.autorizado_diretoria);
    assert!(!criada.liberada());
    assert_eq!(criada.usuario, "JOAO");

    let err = svc.approve_diretoria(&diretor, criada.id).await.unwrap_err();
    assert!(matches!(err, AppError::ControladoriaRequired));
    let intacta = svc.get(&diretor, criada.id).await.unwrap();
    assert!(!intacta.autorizado_diretoria);

    let aprovada = svc.approve_controladoria(&controller, criada.id).await.unwrap();
    assert!(aprovada.autorizado_controladoria);
    assert_eq!(aprovada.usuario_controladoria.as_deref(), Some("ANA"));
    assert!(aprovada.data_autorizacao_controladoria.is_some());

    // depois da aprovação o solicitante não altera nem exclui
    let patch = AtualizarAutorizacaoPayload {
        observacao: Some("urgente".into()),
        ..Default::default()
    };
    assert!(matches!(
        svc.update(&joao, criada.id, &patch).await.unwrap_err(),
        AppError::AlreadyApproved
    ));
    assert!(matches!(
        svc.delete(&joao, criada.id).await.unwrap_err(),
        AppError::AlreadyApproved
    ));

    let liberada = svc.approve_diretoria(&diretor, criada.id).await.unwrap();
    assert!(liberada.liberada());
    assert_eq!(liberada.usuario_diretoria.as_deref(), Some("CEO"));

    assert!(matches!(
        svc.revert_controladoria(&controller, criada.id).await.unwrap_err(),
        AppError::AlreadyReleased
    ));
    let ainda = svc.get(&controller, criada.id).await.unwrap();
    assert!(ainda.autorizado_controladoria && ainda.autorizado_diretoria);
}

#[sqlx::test(migrations = "./migrations")]
async fn revert_clears_the_stamp_in_the_database(pool: PgPool) {
    let st = state(pool);
    let svc = &st.autorizacao_service;
    let controller = quem("ANA", "02");

    let criada = svc.create(&quem("JOAO", "04"), &pedido("01")).await.unwrap();
    svc.approve_controladoria(&controller, criada.id).await.unwrap();

    let revertida = svc.revert_controladoria(&controller, criada.id).await.unwrap();
    assert!(!revertida.autorizado_controladoria);
    assert!(revertida.usuario_controladoria.is_none());
    assert!(revertida.data_autorizacao_controladoria.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn listing_is_scoped_to_the_requester(pool: PgPool) {
    let st = state(pool);
    let svc = &st.autorizacao_service;
    let joao = quem("JOAO", "04");
    let maria = quem("MARIA", "04");

    svc.create(&joao, &pedido("01")).await.unwrap();
    let da_maria = svc.create(&maria, &pedido("02")).await.unwrap();

    let filtro = FiltroAutorizacoes::default();
    let do_joao = svc.list_for(&joao, &filtro).await.unwrap();
    assert_eq!(do_joao.len(), 1);
    assert!(do_joao.iter().all(|a| a.usuario == "JOAO"));

    assert_eq!(svc.list_for(&quem("ANA", "02"), &filtro).await.unwrap().len(), 2);
    assert_eq!(svc.list_for(&quem("CEO", "01"), &filtro).await.unwrap().len(), 2);

    // o nível 00 administra acessos, não enxerga compras alheias
    assert!(svc.list_for(&quem("TI", "00"), &filtro).await.unwrap().is_empty());

    assert!(matches!(
        svc.get(&joao, da_maria.id).await.unwrap_err(),
        AppError::ResourceNotFound(_)
    ));

    let por_loja = FiltroAutorizacoes {
        loja: Some("02".into()),
        ..Default::default()
    };
    let so_loja_02 = svc.list_for(&quem("ANA", "02"), &por_loja).await.unwrap();
    assert_eq!(so_loja_02.len(), 1);
    assert_eq!(so_loja_02[0].id, da_maria.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn missing_records_and_foreign_requesters_get_distinct_errors(pool: PgPool) {
    let st = state(pool);
    let svc = &st.autorizacao_service;
    let joao = quem("JOAO", "04");
    let inexistente = Uuid::new_v4();

    assert!(matches!(
        svc.revert_controladoria(&quem("ANA", "02"), inexistente).await.unwrap_err(),
        AppError::ResourceNotFound(_)
    ));
    assert!(matches!(
        svc.delete(&joao, inexistente).await.unwrap_err(),
        AppError::ResourceNotFound(_)
    ));

    let criada = svc.create(&joao, &pedido("01")).await.unwrap();
    assert!(matches!(
        svc.delete(&quem("MARIA", "04"), criada.id).await.unwrap_err(),
        AppError::Forbidden(_)
    ));
    assert!(matches!(
        svc.update(&joao, criada.id, &AtualizarAutorizacaoPayload::default())
            .await
            .unwrap_err(),
        AppError::NoFieldsToUpdate
    ));

    svc.delete(&joao, criada.id).await.unwrap();
    assert!(matches!(
        svc.get(&joao, criada.id).await.unwrap_err(),
        AppError::ResourceNotFound(_)
    ));
}

async fn cadastrar_produtos(pool: &PgPool, codigos: &[i32]) {
    for codigo in codigos {
        sqlx::query("INSERT INTO produtos (codprod, descricao) VALUES ($1, $2)")
            .bind(codigo)
            .bind(format!("PRODUTO {}", codigo))
            .execute(pool)
            .await
            .unwrap();
    }
}

fn etiquetas(codigos: Vec<i32>) -> ImportarEtiquetasPayload {
    ImportarEtiquetasPayload {
        competencia: "2026-10".into(),
        bandeira: Bandeira::Verde,
        codigos,
        observacao: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn label_import_reports_codes_already_labeled(pool: PgPool) {
    cadastrar_produtos(&pool, &[1, 2, 3]).await;
    sqlx::query(
        "INSERT INTO etiquetas_produto (codprod, competencia, bandeira, usuario) \
         VALUES (2, '2026-10', 'vermelha', 'ANA')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let st = state(pool);
    let relatorio = st
        .produto_service
        .importar(&quem("JOAO", "03"), etiquetas(vec![1, 2, 3]))
        .await
        .unwrap();

    let mut inseridos: Vec<i32> = relatorio.sucesso.iter().map(|e| e.codprod).collect();
    inseridos.sort();
    assert_eq!(inseridos, vec![1, 3]);
    assert_eq!(relatorio.erros.len(), 1);
    assert_eq!(relatorio.erros[0].item, "2");
    assert_eq!(relatorio.erros[0].motivo, MOTIVO_JA_EXISTE);
}

#[sqlx::test(migrations = "./migrations")]
async fn concurrent_label_imports_insert_each_code_once(pool: PgPool) {
    cadastrar_produtos(&pool, &[1, 2, 3]).await;
    let st = state(pool.clone());
    let usuario = quem("JOAO", "03");

    // As duas leituras podem ver a competência vazia; o ON CONFLICT decide.
    // Mesma ordem nos dois lotes para a segunda transação só esperar a primeira.
    let (a, b) = tokio::join!(
        st.produto_service.importar(&usuario, etiquetas(vec![1, 2, 3])),
        st.produto_service.importar(&usuario, etiquetas(vec![1, 2, 3])),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.sucesso.len() + b.sucesso.len(), 3);
    assert_eq!(a.erros.len() + b.erros.len(), 3);
    assert!(a.erros.iter().chain(&b.erros).all(|e| e.motivo == MOTIVO_JA_EXISTE));

    let (gravadas,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM etiquetas_produto WHERE competencia = '2026-10'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(gravadas, 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn goal_import_keeps_good_items_when_one_value_overflows(pool: PgPool) {
    sqlx::query("INSERT INTO vendedores (codusur, nome) VALUES (10, 'ANA'), (20, 'BIA')")
        .execute(&pool)
        .await
        .unwrap();

    let st = state(pool);
    let relatorio = st
        .meta_service
        .importar(
            &quem("GERENTE", "03"),
            ImportarMetasPayload {
                competencia: "2026-10".into(),
                itens: vec![
                    ItemImportacaoMeta {
                        codusur: 10,
                        valor_meta: Decimal::from(1000),
                    },
                    ItemImportacaoMeta {
                        codusur: 20,
                        valor_meta: Decimal::from(1_000_000_000_000_000i64),
                    },
                ],
            },
        )
        .await
        .unwrap();

    assert_eq!(relatorio.sucesso.len(), 1);
    assert_eq!(relatorio.sucesso[0].codusur, 10);
    assert_eq!(relatorio.erros.len(), 1);
    assert_eq!(relatorio.erros[0].item, "20");
}
