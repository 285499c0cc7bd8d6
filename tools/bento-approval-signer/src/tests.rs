#[cfg(test)]
mod tests {
    use crate::encoder::{
        address_of, approval_digest, domain_separator, encode_approval_data, sign_master_contract_approval,
        signing_key_from_hex,
    };
    use crate::types::{CookBatch, DomainParams};
    use alloy_primitives::{address, b256, Address, I256, U256};
    use bento_vault_types::{ActionCode, ApprovalMessage};

    const VAULT: Address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");
    const MASTER: Address = address!("e7f1725e7734ce288f8367e1bb143e90bb3f0512");

    #[test]
    fn test_domain_separator_known_vector() {
        let domain = DomainParams::bento_box(31337, VAULT);
        assert_eq!(
            domain_separator(&domain),
            b256!("d50fd3a406f948fec3bb676c57b85188f4b661bf36ffd4c82cd8c6cadf7b98b1")
        );
    }

    #[test]
    fn test_approval_digest_known_vector() {
        let domain = DomainParams::bento_box(31337, VAULT);
        let message = ApprovalMessage {
            user: address!("7e5f4552091a69125d5dfcb7b8c2659029395bdf"),
            master_contract: MASTER,
            approved: true,
            nonce: U256::ZERO,
        };
        assert_eq!(
            approval_digest(&domain, &message),
            b256!("0981b5803c7923ea3940755e2af27f58cd59e4fc060ad19705f701cc706a74aa")
        );
    }

    #[test]
    fn test_signing_key_from_hex() {
        let key = signing_key_from_hex(
            "0x0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        assert_eq!(address_of(&key), address!("7e5f4552091a69125d5dfcb7b8c2659029395bdf"));
        assert!(signing_key_from_hex("0xzz").is_err());
        assert!(signing_key_from_hex(&"00".repeat(32)).is_err());
    }

    #[test]
    fn test_signature_shape() {
        let key = signing_key_from_hex(&format!("{:064x}", 7)).unwrap();
        let domain = DomainParams::bento_box(1, VAULT);
        let approval = sign_master_contract_approval(&domain, MASTER, true, U256::ZERO, &key).unwrap();
        assert_eq!(approval.user, address_of(&key));
        assert!(approval.signature.v == 27 || approval.signature.v == 28);

        let data = encode_approval_data(&approval);
        assert_eq!(data.len(), 6 * 32);
        // user, left-padded
        assert_eq!(&data[12..32], approval.user.as_slice());
        // approved flag
        assert_eq!(data[95], 1);
        // v
        assert_eq!(data[127], approval.signature.v);
    }

    #[test]
    fn test_cook_batch_keeps_sequences_parallel() {
        let key = signing_key_from_hex(&format!("{:064x}", 7)).unwrap();
        let domain = DomainParams::bento_box(1, VAULT);
        let approval = sign_master_contract_approval(&domain, MASTER, true, U256::ZERO, &key).unwrap();
        let token = Address::repeat_byte(0xaa);

        let mut batch = CookBatch::new();
        batch
            .set_approval(&approval)
            .deposit(token, approval.user, I256::try_from(10).unwrap(), U256::ZERO)
            .transfer(token, MASTER, I256::MINUS_ONE)
            .transfer_multiple(token, &[MASTER], &[U256::from(1)])
            .withdraw(token, approval.user, I256::try_from(1).unwrap());

        assert_eq!(batch.len(), 5);
        assert_eq!(batch.values.len(), 5);
        assert_eq!(batch.datas.len(), 5);
        assert_eq!(
            batch.actions,
            vec![
                ActionCode::SetApproval.as_u8(),
                ActionCode::Deposit.as_u8(),
                ActionCode::Transfer.as_u8(),
                ActionCode::TransferMultiple.as_u8(),
                ActionCode::Withdraw.as_u8(),
            ]
        );
        assert_eq!(batch.actions[0], 24);
    }
}
